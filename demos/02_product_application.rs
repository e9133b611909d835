/// product application - quote against a cooperative product and draft an application
use chrono::{TimeZone, Utc};
use cooperative_loan_rs::{
    format_amount, CalculatorConfig, LoanAmortizer, LoanApplication, Money, PaymentCalendar,
    ProductCatalog, SafeTimeProvider, TimeSource,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap()
    ));

    let config = CalculatorConfig::reconciled();
    let amortizer = LoanAmortizer::new(config.clone())?;
    let catalog = ProductCatalog::cooperative();

    for product in catalog.active() {
        println!(
            "{}: {} - {}, {}% per month, {}-{} months",
            product.name,
            format_amount(product.min_amount, &config.display),
            format_amount(product.max_amount, &config.display),
            product.monthly_rate_percent,
            product.min_tenure_months,
            product.max_tenure_months,
        );
    }

    let product = catalog.get("1")?;
    let mut application = LoanApplication::draft(
        "member-1",
        product,
        Money::from_major(15_000_000),
        18,
        &amortizer,
        &time,
    )?;
    application.attach_document("KTP", "https://files.example/ktp.jpg");

    println!("\nmissing documents: {:?}", application.missing_requirements(product));
    println!("{}\n", application.json()?);

    // due dates for the quoted schedule
    let result = product.quote(application.amount, application.tenure_months, &amortizer)?;
    let calendar = PaymentCalendar::starting_now(&time);
    for installment in calendar.dated_schedule(&result)?.iter().take(3) {
        println!(
            "month {:>2} due {}: {}",
            installment.month,
            installment.due_date.format("%Y-%m-%d"),
            format_amount(installment.payment_amount, &config.display),
        );
    }

    Ok(())
}
