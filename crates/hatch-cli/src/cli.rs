//! Command-line definition for the `hatch` client.
//!
//! Configuration flags are consumed by the configuration loader before clap
//! sees the remaining arguments, so they are only listed in the help footer.

use clap::Parser;

/// Attach to a Hatch remote command console
#[derive(Parser, Debug)]
#[command(
    name = "hatch",
    version,
    after_help = "Configuration flags (must come first): --config-path <PATH>, \
                  --console-endpoint <tcp://HOST:PORT>, --log-filter <FILTER>, \
                  --log-format <FORMAT>.\nOnce attached, type `help` to list commands \
                  and `exit` to leave."
)]
pub(crate) struct Cli {}
