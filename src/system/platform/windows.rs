use std::fs::File;
use std::io;
use std::os::windows::process::CommandExt;
use std::path::Path;

use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn check_tool_access(path: &Path) -> io::Result<()> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            ));
        }
        // Opening for read fails with PermissionDenied under a restrictive ACL.
        File::open(path)?;
        Ok(())
    }

    fn shell_command(line: &str) -> tokio::process::Command {
        // `/S` strips exactly the outer quotes, leaving `line` untouched.
        let mut cmd = std::process::Command::new("cmd");
        cmd.arg("/S").arg("/C").raw_arg(format!("\"{line}\""));
        tokio::process::Command::from(cmd)
    }
}
