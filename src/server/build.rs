//! Le build script.

use std::env;
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::str;


/// File in the $OUT_DIR where the current revision is written.
const REVISION_FILE: &str = "revision";


fn main() {
    // The revision file must exist even if it ends up empty,
    // since it's pulled in by include_str!().
    let out_dir = match env::var("OUT_DIR") {
        Ok(d) => d,
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };
    let rev_path = Path::new(&out_dir).join(REVISION_FILE);
    let mut revision_file = match File::create(&rev_path) {
        Ok(f) => f,
        Err(e) => {
            println!("cargo:warning=Cannot create {}: {}", rev_path.display(), e);
            return;
        }
    };
    match git_head_sha() {
        Ok(rev) => if let Err(e) = revision_file.write_all(rev.as_bytes()) {
            println!("cargo:warning=Failed to write current Git SHA: {}", e);
        },
        Err(e) => println!("cargo:warning=Failed to obtain current Git SHA: {}", e),
    };
}

fn git_head_sha() -> Result<String, Box<dyn Error>> {
    let mut cmd = Command::new("git");
    cmd.args(&["rev-parse", "--short", "HEAD"]);

    let output = cmd.output()?;
    let sha = str::from_utf8(&output.stdout[..])?.trim().to_owned();
    Ok(sha)
}
