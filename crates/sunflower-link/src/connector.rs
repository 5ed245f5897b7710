use sunflower_transport::{SerialConfig, SerialLink};

use crate::error::Result;
use crate::link::{Link, LinkConfig};

/// Open a serial endpoint with default line settings and start a link on it.
pub fn open(endpoint: &str) -> Result<Link<SerialLink>> {
    open_with_config(endpoint, &SerialConfig::default(), LinkConfig::default())
}

/// Open a serial endpoint with explicit configuration.
pub fn open_with_config(
    endpoint: &str,
    serial_config: &SerialConfig,
    link_config: LinkConfig,
) -> Result<Link<SerialLink>> {
    let port = SerialLink::open(endpoint, serial_config)?;
    Link::new(port, link_config)
}
