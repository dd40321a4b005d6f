/*!
Small, shared utilities used across the SSDP, description, and HTTP layers.
*/

pub mod headers;

pub mod interface;

pub mod user_agent;

pub mod xml;
