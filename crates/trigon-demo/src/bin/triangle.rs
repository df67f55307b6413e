use std::process::ExitCode;

fn main() -> ExitCode {
    trigon_demo::launch(trigon_demo::scenes::triangle())
}
