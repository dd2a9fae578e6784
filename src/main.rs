//! repo2txt: convert repositories into a single prompt-ready text file

use anyhow::Result;

fn main() -> Result<()> {
    repo2txt::cli::run()
}
