use std::process::ExitCode;
use tabplot::app::main_with;
use tabplot::Variant;

fn main() -> ExitCode {
    main_with(Variant::POINTS)
}
