use super::Outcome;
use provision_core::config::Config;
use std::io::Write;
use std::path::Path;

const SAMPLE_CONFIG: &str = r#"# provision configuration
# Every field is optional; command-line flags take precedence.

# key-value server holding the scripts and files
url: http://localhost:8000

# levels of specialization, most generic first:
# with [mattermost, production], "script" is looked up at
# <url>/mattermost/production/script, then <url>/mattermost/script, then <url>/script
levels: []

# lifetime of cached HTTP responses, in seconds
cache: 300

# where execution reports are kept
reports_path: /var/provision/reports

# run: maximum number of attempts per command, and seconds between two attempts
attempts: 4
pause: 10
"#;

/// Shows the configuration in effect, or writes a sample file with `init`.
pub fn run(path: &Path, config: &Config, init: bool, out: &mut impl Write) -> anyhow::Result<Outcome> {
    if init {
        if path.exists() {
            writeln!(out, "Config already exists at: {}", path.display())?;
            writeln!(out, "Remove it first if you want to reinitialize.")?;
            return Ok(Outcome::Completed);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, SAMPLE_CONFIG)?;
        writeln!(out, "Sample config written to: {}", path.display())?;
        return Ok(Outcome::Completed);
    }

    writeln!(out, "Config path:  {}", path.display())?;
    if !path.exists() {
        writeln!(out, "Status:       not found, using defaults")?;
    }
    writeln!(out, "URL:          {}", config.url)?;
    writeln!(out, "Levels:       {}", config.levels.join(" "))?;
    writeln!(out, "Cache:        {}s", config.cache)?;
    writeln!(out, "Reports path: {}", config.reports_path.display())?;
    writeln!(out, "Attempts:     {}", config.attempts)?;
    writeln!(out, "Pause:        {}s", config.pause)?;
    Ok(Outcome::Completed)
}
