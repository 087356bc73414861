mod styling;
mod tables;

pub use tables::print_candidates;

use styling::{dim, magenta_bold};

/// Prints the banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🔗 ontrack-bridge"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Ontrack promotion triggers")
    );
}
