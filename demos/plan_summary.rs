use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    taskbatch::example_apps::run_plan_summary(std::env::args().skip(1))
}
