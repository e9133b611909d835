/// loan quote - parse the calculator form and print the schedule
use cooperative_loan_rs::{CalculatorConfig, CalculatorForm, LoanAmortizer, QuoteSummary, QuoteView, ScheduleTable};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let config = CalculatorConfig::cooperative();
    let amortizer = LoanAmortizer::new(config.clone())?;

    // amount typed by the member, tenure and rate left at their defaults
    let mut form = CalculatorForm::with_defaults(&config);
    form.set_amount("12.000.000");
    form.set_interest_rate("1");

    let request = form.to_request()?;
    let result = amortizer.compute_schedule(&request)?;

    let summary = QuoteSummary::new(&result, &config.display);
    println!("monthly payment: {}", summary.monthly_payment);
    println!("total interest:  {}", summary.total_interest);
    println!("total payment:   {}\n", summary.total_payment);

    println!("{}\n", ScheduleTable::new(&result, &config.display).render());

    println!("{}", QuoteView::from_quote(&request, &result).rounded(2).to_json_pretty()?);

    Ok(())
}
