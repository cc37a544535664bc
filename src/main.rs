use std::error::Error;
use vcn_subnet_planner::config::Config;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default())
        .map_err(|e| format!("Error initializing log4rs: {e}"))?;
    dotenv::dotenv().ok();
    //
    log::info!("#Start main()");

    let config = Config::load()?;
    let plan_file = vcn_subnet_planner::run(&config)?;

    log::info!("#End main() plan written to {plan_file}");
    Ok(())
}
