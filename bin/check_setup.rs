// Macro Tracker - Setup Check
// Verifies environment variables, FRED access, the database, and ntfy.sh.
// Run after filling in .env; pass --notify to also send a test push.

use anyhow::Result;

use macro_tracker::config::AppConfig;
use macro_tracker::db::Database;
use macro_tracker::fetcher::{FredClient, SERIES_GDP_GROWTH, SERIES_REAL_RATE};
use macro_tracker::notifier::Notifier;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    println!("============================================================");
    println!("MACRO TRACKER - COMPONENT CHECK");
    println!("============================================================");

    println!("\n1. Environment variables...");
    let config = match AppConfig::from_env() {
        Ok(config) => {
            println!("   ✓ FRED_API_KEY, SUPABASE_URL, SUPABASE_KEY, NTFY_TOPIC set");
            if config.gemini_api_key.is_none() {
                println!("   ℹ GEMINI_API_KEY not set (AI summaries disabled)");
            }
            config
        }
        Err(e) => {
            eprintln!("   ✗ {:#}", e);
            eprintln!("   Fill in your credentials in .env and re-run");
            std::process::exit(1);
        }
    };

    println!("\n2. FRED API...");
    let fetcher = FredClient::new(config.fred_api_key.clone());
    match fetcher.fetch_latest(SERIES_GDP_GROWTH).await {
        Ok(point) => println!("   ✓ GDP Growth: {:.2}% (as of {})", point.value, point.date),
        Err(e) => eprintln!("   ✗ GDP fetch failed: {:#}", e),
    }
    match fetcher.fetch_inflation_yoy().await {
        Ok(value) => println!("   ✓ Inflation (YoY): {:.2}%", value),
        Err(e) => eprintln!("   ✗ Inflation fetch failed: {:#}", e),
    }
    match fetcher.fetch_latest(SERIES_REAL_RATE).await {
        Ok(point) => println!("   ✓ Real Rate: {:.2}%", point.value),
        Err(e) => eprintln!("   ✗ Real rate fetch failed: {:#}", e),
    }

    println!("\n3. Database...");
    let db = Database::new(config.supabase_url.clone(), config.supabase_key.clone());
    match db.get_latest().await {
        Ok(Some(reading)) => {
            println!("   ✓ Connected, latest reading from {}", reading.created_at)
        }
        Ok(None) => println!("   ✓ Connected, table is empty (normal for a first run)"),
        Err(e) => eprintln!("   ✗ Database check failed: {:#}", e),
    }

    println!("\n4. Notifications...");
    let notifier = Notifier::new(config.ntfy_topic.clone());
    println!("   Subscribe on your phone: {}", notifier.topic_url());
    if std::env::args().any(|arg| arg == "--notify") {
        match notifier.send_test().await {
            Ok(()) => println!("   ✓ Notification sent! Check your phone."),
            Err(e) => eprintln!("   ✗ Notification failed: {:#}", e),
        }
    } else {
        println!("   (pass --notify to send a test notification)");
    }

    println!("\n============================================================");
    println!("CHECK COMPLETE");
    println!("============================================================");
    println!("\nNext steps:");
    println!("1. cargo run --bin macro-tracker");
    println!("2. Open http://localhost:8000 in your browser");
    println!("3. Point a cron job at /api/update-data");

    Ok(())
}
