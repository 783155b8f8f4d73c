/// Run-wide switches threaded through the update pipeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunConfig {
    /// Compute and report changes without writing or restarting anything.
    pub dry_run: bool,
    /// Skip the interactive confirmation gate.
    pub assume_yes: bool,
}
