/**
SOAP action invocation, device side and control-point side.

```http
POST path of control URL HTTP/1.1
HOST: host of control URL:port of control URL
CONTENT-LENGTH: bytes in body
CONTENT-TYPE: text/xml; charset="utf-8"
SOAPACTION: "urn:schemas-upnp-org:service:serviceType:v#actionName"

<?xml version="1.0"?>
<s:Envelope
   xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"
   s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
   <s:Body>
      <u:actionName xmlns:u="urn:schemas-upnp-org:service:serviceType:v">
         <argumentName>in arg value</argumentName>
         other in args and their values go here, if any
      </u:actionName>
   </s:Body>
</s:Envelope>
```

[`envelope`] parses and serializes the envelope itself, [`dispatch`] resolves a request to a
registered action and runs its handler (device side), and [`client`] composes a request and
decodes the reply (control-point side).
*/

pub mod protocol;

pub mod envelope;
pub use envelope::{ActionRequest, Fault};

pub mod dispatch;
pub use dispatch::{dispatch, DispatchOutcome};

pub mod client;
pub use client::call_action;
