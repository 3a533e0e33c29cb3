//! `seclog describe` command implementation.

use anyhow::Result;

use seclog_audit::content_security_activity_type;

pub fn run() -> Result<()> {
    let activity_type = content_security_activity_type();
    println!("{}", serde_json::to_string_pretty(&activity_type)?);
    Ok(())
}
