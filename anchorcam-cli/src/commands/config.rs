//! Print the effective configuration

use crate::config::Config;
use anyhow::Result;

/// Render the configuration as TOML
pub fn render(config: &Config) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

/// Print the configuration to stdout
pub fn show(config: &Config) -> Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_every_section() {
        let text = render(&Config::default()).unwrap();
        assert!(text.contains("[display]"));
        assert!(text.contains("[render]"));
        assert!(text.contains("[simulation]"));
        assert!(text.contains("rotation = \"rotation0\""));
    }
}
