use human_panic::setup_panic;
use std::str::FromStr;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;
use upnp::model::device::Device;
use upnp::model::service::{
    AllowedRange, Direction, ParameterSpec, ServiceSpec, StateVariableSpec,
};
use upnp::ssdp::search::{search_once, Options as SearchOptions, SearchTarget};
use upnp::types::DataType;

#[derive(Debug, StructOpt)]
#[structopt(name = "upnpd")]
struct CommandLine {
    /// The level of logging to perform, from off to trace.
    #[structopt(long, short = "v", parse(from_occurrences))]
    verbose: i8,

    /// Enable debug-level logging regardless of `-v`.
    #[structopt(long)]
    debug: bool,

    /// Explicitly disable debug-level logging.
    #[structopt(long, conflicts_with = "debug")]
    no_debug: bool,

    #[structopt(long, short)]
    interface: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Send an M-SEARCH and print the responses received before the wait time elapses.
    Search {
        /// One of `all`, `root`, `uuid:<device-UUID>`,
        /// `urn:schemas-upnp-org:device:<type>`, or `urn:schemas-upnp-org:service:<type>`.
        #[structopt(long, short)]
        search_target: Option<String>,

        #[structopt(long, short)]
        max_wait: Option<u8>,
    },
    /// Listen for NOTIFY/M-SEARCH traffic on the multicast group without responding.
    Listen,
    /// Host a small reference device until interrupted.
    Serve {
        #[structopt(long, default_value = "0")]
        port: u16,
    },
}

pub fn main() {
    setup_panic!();

    let args = CommandLine::from_args();
    init_tracing(&args);

    let exit_code = match args.cmd {
        Command::Search {
            search_target,
            max_wait,
        } => do_search(args.interface, search_target, max_wait),
        Command::Listen => do_listen(args.interface),
        Command::Serve { port } => do_serve(args.interface, port),
    };
    std::process::exit(exit_code);
}

// ------------------------------------------------------------------------------------------------
// Private Functions
// ------------------------------------------------------------------------------------------------

fn init_tracing(args: &CommandLine) {
    let default_level = if args.debug {
        "debug"
    } else if args.no_debug {
        "off"
    } else {
        match args.verbose {
            0 => "off",
            1 => "error",
            2 => "warn",
            3 => "info",
            4 => "debug",
            _ => "trace",
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .init();
}

fn do_search(
    bind_to_interface: Option<String>,
    search_target: Option<String>,
    max_wait_time: Option<u8>,
) -> i32 {
    let mut options = SearchOptions::default_for(upnp::SpecVersion::V10);
    options.network_interface = bind_to_interface;
    if let Some(search_target) = search_target {
        match SearchTarget::from_str(&search_target) {
            Ok(target) => options.search_target = target,
            Err(_) => {
                eprintln!("'{}' is not a recognized search target", search_target);
                return 1;
            }
        }
    }
    if let Some(max_wait_time) = max_wait_time {
        options.max_wait_time = max_wait_time;
    }
    match search_once(options) {
        Ok(responses) => {
            println!("search returned {} results.", responses.len());
            for (index, response) in responses.iter().enumerate() {
                println!("{}: {:#?}", index, response);
            }
            0
        }
        Err(error) => {
            eprintln!("search failed with error: {:#?}", error);
            2
        }
    }
}

fn do_listen(network_interface: Option<String>) -> i32 {
    let listener = match upnp::ssdp::listener::Listener::start(network_interface) {
        Ok(listener) => listener,
        Err(error) => {
            eprintln!("failed to start listener: {:#?}", error);
            return 2;
        }
    };
    println!("listening for SSDP traffic, press Ctrl-C to stop...");
    let running = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
    let handler_flag = std::sync::Arc::clone(&running);
    if ctrlc::set_handler(move || handler_flag.store(false, std::sync::atomic::Ordering::SeqCst)).is_err() {
        eprintln!("failed to install Ctrl-C handler");
    }
    while running.load(std::sync::atomic::Ordering::SeqCst) {
        for incoming in listener.try_recv_all() {
            println!("{:?} from {}", incoming.datagram.kind, incoming.peer);
        }
        std::thread::sleep(std::time::Duration::from_millis(200));
    }
    listener.stop();
    0
}

/// Builds a small reference device: a single service with one informational action, enough to
/// exercise discovery, description, and SOAP dispatch end-to-end.
fn build_demo_device() -> upnp::model::device::DeviceRef {
    let device = upnp::model::device::create("BinaryLight", "Reference Light", |d| {
        d.manufacturer = "upnp-host".to_string();
        d.model_name = "Reference Light".to_string();
    })
    .expect("device construction cannot fail for a static demo device");

    let spec = ServiceSpec::new()
        .with_service_id("1")
        .state_variable(StateVariableSpec {
            name: "Status".to_string(),
            data_type: DataType::Boolean,
            default_value: Some("0".to_string()),
            allowed_values: None,
            allowed_range: None::<AllowedRange>,
            evented: true,
        })
        .action(
            "GetStatus",
            vec![ParameterSpec {
                direction: Direction::RetVal,
                name: "ResultStatus".to_string(),
                related_state_variable: "Status".to_string(),
            }],
            Box::new(|_args| Ok(vec!["0".to_string()])),
        );
    Device::add_service(&device, "SwitchPower", spec);
    device
}

fn do_serve(network_interface: Option<String>, port: u16) -> i32 {
    let device = build_demo_device();
    let options = upnp::runtime::Options {
        network_interface,
        http_port: port,
        ..upnp::runtime::Options::default()
    };
    let running = match upnp::runtime::run(device, options) {
        Ok(running) => running,
        Err(error) => {
            eprintln!("failed to start device: {:#?}", error);
            return 2;
        }
    };
    println!(
        "serving at {}, description at {}, press Ctrl-C to stop...",
        running.local_address(),
        running.location
    );

    let stop = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let handler_flag = std::sync::Arc::clone(&stop);
    if ctrlc::set_handler(move || handler_flag.store(true, std::sync::atomic::Ordering::SeqCst)).is_err() {
        eprintln!("failed to install Ctrl-C handler");
    }
    while !stop.load(std::sync::atomic::Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(200));
    }
    running.shutdown();
    0
}
