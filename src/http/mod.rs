/*!
The HTTP host, serving the device description, per-service SCPDs, and SOAP control URLs off
a single accept thread. See [`server::Host`] for the running server and §4.E for the route
table.
*/

pub mod request;

pub mod response;

pub mod server;
pub use server::Host;
