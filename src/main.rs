//! luach command-line entry point.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use luach::calendar::{diff, CalendarApi, HebcalClient, HebrewDateQuery};
use luach::chat::format::{describe_diff, describe_weeks, format_date_ru, weekday_ru};
use luach::chat::ChatBot;
use luach::config::Config;
use luach::llm::OpenRouterClient;
use luach::search::SefariaClient;

/// Calendar-aware assistant for Jewish texts and the Hebrew calendar.
#[derive(Parser, Debug)]
#[command(name = "luach")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask a single question and print the answer
    Ask {
        /// The question
        query: Vec<String>,
    },
    /// Show today's date in both calendars
    Today,
    /// Convert a Gregorian date (YYYY-MM-DD) to the Hebrew calendar
    Convert {
        /// Gregorian date, YYYY-MM-DD
        date: NaiveDate,
    },
    /// Convert a Hebrew date to the Gregorian calendar
    ConvertHebrew {
        /// Hebrew year, e.g. 5784
        year: i32,
        /// Hebrew month name, e.g. Nisan
        month: String,
        /// Day of month
        day: u32,
    },
    /// List holidays of a Gregorian year
    Holidays {
        /// Year; defaults to the current one
        year: Option<i32>,
    },
    /// Difference between two Gregorian dates (YYYY-MM-DD)
    Diff {
        first: NaiveDate,
        second: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("luach=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    let calendar = HebcalClient::from_config(&config.calendar)?;

    match args.command {
        Some(Command::Today) => {
            let today = chrono::Local::now().date_naive();
            let converted = calendar.to_hebrew(today).await?;
            println!(
                "{} ({}) — {}",
                format_date_ru(today),
                weekday_ru(converted.weekday()),
                converted.hebrew_label
            );
        }
        Some(Command::Convert { date }) => {
            let converted = calendar.to_hebrew(date).await?;
            println!(
                "{} ({}) = {} [{} {} {}]",
                format_date_ru(date),
                weekday_ru(converted.weekday()),
                converted.hebrew_label,
                converted.hebrew.day,
                converted.hebrew.month,
                converted.hebrew.year,
            );
        }
        Some(Command::ConvertHebrew { year, month, day }) => {
            let request = HebrewDateQuery {
                year: Some(year),
                month: Some(month),
                day: Some(day),
            };
            let converted = calendar.to_gregorian(&request).await?;
            println!(
                "{} = {} ({})",
                converted.hebrew,
                format_date_ru(converted.gregorian),
                weekday_ru(converted.weekday()),
            );
        }
        Some(Command::Holidays { year }) => {
            let year = year.unwrap_or_else(|| {
                use chrono::Datelike;
                chrono::Local::now().year()
            });
            for item in calendar.holidays_in_year(year).await? {
                match &item.description {
                    Some(desc) => println!("{} — {}: {}", item.date, item.title, desc),
                    None => println!("{} — {}", item.date, item.title),
                }
            }
        }
        Some(Command::Diff { first, second }) => {
            let result = diff(first, second);
            println!("{} дн.", result.days);
            println!("Календарная разница: {}.", describe_diff(&result));
            println!("В неделях: {}.", describe_weeks(&result));
        }
        Some(Command::Ask { query }) => {
            let bot = build_bot(&config)?;
            println!("{}", bot.handle_query(&query.join(" ")).await);
        }
        None => {
            chat_loop(&config).await?;
        }
    }

    Ok(())
}

fn build_bot(config: &Config) -> Result<ChatBot> {
    let llm = Arc::new(OpenRouterClient::from_config(&config.llm)?);
    let search = Arc::new(SefariaClient::from_config(&config.search)?);
    let calendar = Arc::new(HebcalClient::from_config(&config.calendar)?);
    Ok(ChatBot::new(llm, search, calendar).with_context_hits(config.search.context_hits))
}

/// Interactive loop: one query per line, empty line or EOF exits.
async fn chat_loop(config: &Config) -> Result<()> {
    let bot = build_bot(config)?;
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            break;
        }
        println!("{}", bot.handle_query(query).await);
    }

    Ok(())
}
