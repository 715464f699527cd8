use std::process::ExitCode;

fn main() -> ExitCode {
    promql_to_dd::entry::run()
}
