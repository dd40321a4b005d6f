/*!
The runtime shape of a hosted service: its action/state-variable catalog (a [`ServiceSpec`])
plus the SOAP dispatcher's handler table, attached to a [`super::device::Device`] node.
*/
use crate::description::scpd;
use crate::description::{SpecVersion, TypeID};
use crate::model::device::DeviceRef;
use crate::types::DataType;
use crate::{Error, UPNP_DOMAIN};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;
use std::sync::{Arc, RwLock, Weak};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

pub type ServiceRef = Arc<RwLock<Service>>;

/// Where an argument's value flows; `RetVal` is always the first `out` parameter, per UDA
/// convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    RetVal,
}

/// One formal parameter of an [`ActionSpec`]; its data type is resolved indirectly, through
/// `related_state_variable`, at dispatch time.
#[derive(Clone, Debug)]
pub struct ParameterSpec {
    pub direction: Direction,
    pub name: String,
    pub related_state_variable: String,
}

/// An action handler receives its in-parameters, coerced and in declaration order, and
/// returns its out-parameters (retval first when present) in the same order, or a typed
/// UPnP fault.
pub type ActionHandler = dyn Fn(&[String]) -> Result<Vec<String>, Error> + Send + Sync;

pub struct ActionSpec {
    pub name: String,
    pub parameters: Vec<ParameterSpec>,
    pub handler: Box<ActionHandler>,
}

impl Debug for ActionSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSpec")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct AllowedRange {
    pub minimum: f64,
    pub maximum: f64,
    pub step: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct StateVariableSpec {
    pub name: String,
    pub data_type: DataType,
    pub default_value: Option<String>,
    pub allowed_values: Option<Vec<String>>,
    pub allowed_range: Option<AllowedRange>,
    pub evented: bool,
}

/// The action/state-variable catalog for one service class, held by value on each
/// [`Service`] instance rather than as a class-level static (see DESIGN.md OQ-1).
#[derive(Debug, Default)]
pub struct ServiceSpec {
    pub service_id: Option<String>,
    actions: HashMap<String, ActionSpec>,
    state_variables: HashMap<String, StateVariableSpec>,
}

#[derive(Debug)]
pub struct Service {
    pub service_type: String,
    pub spec: ServiceSpec,
    pub(crate) parent: Weak<RwLock<crate::model::device::Device>>,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl ServiceSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fluent registration of an action, mirroring the way `httpu::RequestBuilder`
    /// accumulates headers.
    pub fn action(
        mut self,
        name: &str,
        parameters: Vec<ParameterSpec>,
        handler: Box<ActionHandler>,
    ) -> Self {
        self.actions.insert(
            name.to_string(),
            ActionSpec {
                name: name.to_string(),
                parameters,
                handler,
            },
        );
        self
    }

    pub fn state_variable(mut self, variable: StateVariableSpec) -> Self {
        self.state_variables
            .insert(variable.name.clone(), variable);
        self
    }

    pub fn with_service_id(mut self, id: &str) -> Self {
        self.service_id = Some(id.to_string());
        self
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }

    pub fn find_action(&self, name: &str) -> Option<&ActionSpec> {
        self.actions.get(name)
    }

    pub fn find_state_variable(&self, name: &str) -> Option<&StateVariableSpec> {
        self.state_variables.get(name)
    }

    /// Render this catalog as an SCPD document, per § 4.B's element ordering (actions sorted
    /// lexicographically, state variables in declared order).
    pub fn to_scpd(&self) -> scpd::Scpd {
        let mut action_names: Vec<&String> = self.actions.keys().collect();
        action_names.sort();
        let action_list = action_names
            .into_iter()
            .map(|name| {
                let spec = &self.actions[name];
                scpd::Action {
                    name: spec.name.clone(),
                    argument_list: spec
                        .parameters
                        .iter()
                        .map(|p| scpd::Argument {
                            name: p.name.clone(),
                            direction: match p.direction {
                                Direction::In => scpd::Direction::In,
                                Direction::Out => scpd::Direction::Out,
                                Direction::RetVal => scpd::Direction::ReturnValue,
                            },
                            related_state_variable: p.related_state_variable.clone(),
                        })
                        .collect(),
                }
            })
            .collect();

        let service_state_table = self
            .state_variables
            .values()
            .map(|v| scpd::StateVariable {
                send_events: v.evented,
                name: v.name.clone(),
                data_type: v.data_type.token().to_string(),
                default_value: v.default_value.clone(),
                allowed_values: match (&v.allowed_values, &v.allowed_range) {
                    (Some(values), _) => Some(scpd::AllowedValue::List {
                        values: values.clone(),
                    }),
                    (None, Some(range)) => Some(scpd::AllowedValue::Range {
                        minimum: range.minimum.to_string(),
                        maximum: range.maximum.to_string(),
                        step: range.step.map(|s| s.to_string()),
                    }),
                    (None, None) => None,
                },
            })
            .collect();

        scpd::Scpd {
            spec_version: SpecVersion::default(),
            action_list,
            service_state_table,
        }
    }
}

// ------------------------------------------------------------------------------------------------

impl Service {
    pub fn new(service_type: &str, spec: ServiceSpec, parent: &DeviceRef) -> ServiceRef {
        Arc::new(RwLock::new(Service {
            service_type: service_type.to_string(),
            spec,
            parent: Arc::downgrade(parent),
        }))
    }

    pub fn parent(&self) -> Option<DeviceRef> {
        self.parent.upgrade()
    }

    pub fn type_urn(&self) -> TypeID {
        TypeID::new_service(self.service_type.clone(), "1")
    }

    /// `urn:<domain-with-dots-replaced-by-dashes>:serviceId:<id>`; `<id>` defaults to the
    /// service's type token when the spec does not declare one explicitly.
    pub fn service_id(&self) -> String {
        let id = self
            .spec
            .service_id
            .clone()
            .unwrap_or_else(|| self.service_type.clone());
        format!(
            "urn:{}:serviceId:{}",
            UPNP_DOMAIN.replace('.', "-"),
            id
        )
    }

    /// `/` joined with the ancestor chain's types (root last), then this service's type.
    pub fn path(&self) -> Result<String, Error> {
        let device = self
            .parent()
            .ok_or_else(|| Error::UnknownServiceId {
                service_id: self.service_id(),
            })?;
        let device_path = device.read().unwrap().device_path();
        Ok(format!("{}/{}", device_path, self.service_type))
    }

    pub fn scpd_url(&self) -> Result<String, Error> {
        self.path()
    }

    pub fn control_url(&self) -> Result<String, Error> {
        Ok(format!("{}/control", self.path()?))
    }

    pub fn event_sub_url(&self) -> Result<String, Error> {
        Ok(format!("{}/event_sub", self.path()?))
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            "retval" => Ok(Direction::RetVal),
            _ => Err(()),
        }
    }
}
