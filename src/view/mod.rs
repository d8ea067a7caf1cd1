use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

pub mod messages;
pub mod page_renderer;

pub(crate) fn parse_template(src: &'static str, name: &str) -> io::Result<Template<'static>> {
    match Template::new(src) {
        Ok(tpl) => Ok(tpl),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing {} template: {}", name, e))),
    }
}
