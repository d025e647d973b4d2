use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use invest_smart::config::Settings;
use invest_smart::currency::{format_money, Currency};
use invest_smart::instruments::{demo_catalog, load_catalog, Instrument, InstrumentTypeFilter};
use invest_smart::investor::{effective_profile, RiskProfile, UserProfile};
use invest_smart::news::{demo_feed, time_ago};
use invest_smart::notifications::{NotificationCenter, NotificationKind};
use invest_smart::plans::{BillingPeriod, PlanTier};
use invest_smart::portfolio::{parse_amount, AllocationRequest, AllocationResult};
use invest_smart::quiz::{QuizSession, QUESTIONS};
use invest_smart::store::LocalStore;
use invest_smart::Analyzer;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Profile-driven portfolio allocation demo", long_about = None)]
struct Cli {
    /// Settings file (defaults to ./invest_smart.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Suggest where to put an amount of money
    Analyze {
        /// Amount to invest in BRL, pt-BR notation (10.000,50)
        #[arg(long)]
        amount: String,
        /// all, stocks, bonds, crypto or funds
        #[arg(long = "type", default_value = "all")]
        kind: InstrumentTypeFilter,
        /// Overrides the stored profile
        #[arg(long)]
        profile: Option<RiskProfile>,
        #[arg(long)]
        currency: Option<Currency>,
    },
    /// Show or replace the investor profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Answer the onboarding quiz, e.g. --answers 0,1,2,1,3
    Quiz {
        #[arg(long, value_delimiter = ',')]
        answers: Vec<usize>,
        #[arg(long, default_value = "monthly", value_parser = parse_billing)]
        billing: BillingPeriod,
    },
    /// List subscription plans
    Plans {
        #[arg(long, default_value = "monthly", value_parser = parse_billing)]
        billing: BillingPeriod,
    },
    /// List the instrument catalog
    Catalog,
    /// Latest market headlines
    News,
    /// Manage the watchlist
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },
    /// Manage notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    Show,
    Set {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "moderate")]
        profile: RiskProfile,
        /// Investment goal in BRL
        #[arg(long, default_value_t = invest_smart::investor::DEFAULT_INVESTMENT_GOAL)]
        goal: f64,
        /// 1 (low) to 10 (high)
        #[arg(long, default_value_t = invest_smart::investor::DEFAULT_RISK_TOLERANCE)]
        tolerance: u8,
        #[arg(long, default_value = "BRL")]
        currency: Currency,
    },
}

#[derive(Subcommand, Debug)]
enum WatchAction {
    List,
    Add { id: String },
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum NotificationAction {
    List,
    Add {
        #[arg(long, value_parser = parse_notification_kind)]
        kind: NotificationKind,
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
    },
    Read { id: String },
    Clear { id: String },
}

fn parse_billing(s: &str) -> std::result::Result<BillingPeriod, String> {
    match s.to_ascii_lowercase().as_str() {
        "monthly" => Ok(BillingPeriod::Monthly),
        "annual" | "yearly" => Ok(BillingPeriod::Annual),
        other => Err(format!("unknown billing period '{}'", other)),
    }
}

fn parse_notification_kind(s: &str) -> std::result::Result<NotificationKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "alert" => Ok(NotificationKind::Alert),
        "opportunity" => Ok(NotificationKind::Opportunity),
        "warning" => Ok(NotificationKind::Warning),
        other => Err(format!("unknown notification type '{}'", other)),
    }
}

fn load_pool(settings: &Settings) -> Result<Vec<Instrument>> {
    match &settings.catalog_path {
        Some(path) => load_catalog(path)
            .with_context(|| format!("Failed to load catalog '{}'", path.display())),
        None => Ok(demo_catalog()),
    }
}

fn signed(value: f64) -> String {
    format!("{}{:.2}%", if value >= 0.0 { "+" } else { "" }, value)
}

fn print_analysis(result: &AllocationResult, request: &AllocationRequest, currency: Currency) {
    println!(
        "Profile: {} | Type: {} | Currency: {}",
        request.risk_profile,
        request.instrument_type_filter.label(),
        currency
    );
    println!(
        "Estimated return: {}   Risk: {} (score {:.1}/3.0)   Diversification: {} assets",
        signed(result.total_return),
        result.risk_label(),
        result.risk_score,
        result.lines.len()
    );
    println!("{}", result.recommendation_text);
    println!();

    if result.lines.is_empty() {
        println!("No suitable instruments matched this profile and filter.");
        return;
    }

    for line in &result.lines {
        let inst = &line.instrument;
        println!(
            "{:>6.1}%  {:>16}  {} [{}, {} risk, {} 24h]",
            line.percentage,
            format_money(line.amount, currency),
            inst.name,
            inst.kind.label(),
            inst.risk_tier,
            signed(inst.change_percent)
        );
        println!("         {}", line.reasoning);
    }
}

async fn analyze(
    settings: &Settings,
    store: &LocalStore,
    amount: &str,
    kind: InstrumentTypeFilter,
    profile: Option<RiskProfile>,
    currency: Option<Currency>,
) -> Result<()> {
    // Validation happens here, before the allocator is involved.
    let amount = parse_amount(amount)?;

    let stored = store.user_profile();
    let risk_profile = profile.unwrap_or_else(|| effective_profile(stored.as_ref()));
    let currency = currency
        .or_else(|| stored.as_ref().map(|p| p.preferred_currency))
        .unwrap_or(settings.default_currency);

    let request = AllocationRequest::new(amount, risk_profile, kind)?;
    let pool = load_pool(settings)?;

    println!("Analysing...");
    let analyzer = Analyzer::new(settings.analysis_delay());
    let result = analyzer.run(request, pool).await?;
    print_analysis(&result, &request, currency);
    Ok(())
}

fn profile_command(store: &LocalStore, action: ProfileAction) -> Result<()> {
    match action {
        ProfileAction::Show => match store.user_profile() {
            Some(p) => {
                println!("Name: {}", p.name);
                println!("Profile: {} - {}", p.risk_profile, p.risk_profile.description());
                println!(
                    "Investment goal: {}",
                    format_money(p.investment_goal, p.preferred_currency)
                );
                println!("Risk tolerance: {}/10", p.risk_tolerance);
                println!("Preferred currency: {}", p.preferred_currency);
            }
            None => println!("No profile yet. Analyses will use the moderate profile."),
        },
        ProfileAction::Set {
            name,
            profile,
            goal,
            tolerance,
            currency,
        } => {
            let profile = UserProfile::new(&name, profile, goal, tolerance, currency)?;
            store.save_user_profile(&profile)?;
            log::info!("Saved {} profile for {}", profile.risk_profile, profile.name);
            println!("Profile saved.");
        }
    }
    Ok(())
}

fn print_plans(billing: BillingPeriod, recommended: Option<PlanTier>) {
    for tier in PlanTier::ALL {
        let plan = tier.plan();
        let quote = plan.quote(billing);
        let mut tags = Vec::new();
        if plan.popular {
            tags.push("MOST POPULAR");
        }
        if recommended == Some(tier) {
            tags.push("RECOMMENDED FOR YOU");
        }

        print!("{:<14} R$ {}/month", plan.name, quote.per_month);
        if let (Some(total), Some(savings)) = (quote.annual_total, quote.savings_percent) {
            print!(" (R$ {}/year, save {}%)", total, savings);
        }
        if !tags.is_empty() {
            print!("  [{}]", tags.join(", "));
        }
        println!();
        for feature in plan.features {
            println!("    - {}", feature);
        }
    }
}

fn quiz_command(answers: &[usize], billing: BillingPeriod) -> Result<()> {
    let mut session = QuizSession::from_answers(answers)?;
    session.billing = billing;

    if session.answers().len() < QUESTIONS.len() {
        let question = session.current_question();
        println!(
            "Question {} of {} ({}%): {}",
            session.answers().len() + 1,
            QUESTIONS.len(),
            session.progress_percent(),
            question.text
        );
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}) {}", i, option);
        }
        return Ok(());
    }

    let plan = session.checkout()?;
    println!("Analysis complete! The plan that fits you best: {}", plan);
    if let Some(profile) = session.suggested_profile() {
        println!("Suggested investor profile: {} ({})", profile, profile.description());
    }
    println!();
    print_plans(session.billing, Some(plan));
    Ok(())
}

fn news_command() {
    let now = Utc::now();
    for item in demo_feed(now) {
        println!("[{}] {}", item.impact.marker(), item.title);
        println!("    {}", item.summary);
        println!("    {} - {}", item.source, item.age(now));
    }
}

fn catalog_command(settings: &Settings, store: &LocalStore) -> Result<()> {
    let watchlist = store.watchlist();
    for inst in load_pool(settings)? {
        let marker = if watchlist.contains(&inst.id) { "*" } else { " " };
        println!(
            "{} {:<14} {:<22} {:<7} {:>14} {:>8} {:<6} {:?}",
            marker,
            inst.id,
            inst.name,
            inst.kind.label(),
            format_money(inst.current_price, settings.default_currency),
            signed(inst.change_percent),
            inst.risk_tier,
            inst.recommendation
        );
    }
    Ok(())
}

fn watch_command(settings: &Settings, store: &LocalStore, action: WatchAction) -> Result<()> {
    let mut watchlist = store.watchlist();
    match action {
        WatchAction::List => {
            for id in &watchlist {
                println!("{}", id);
            }
            return Ok(());
        }
        WatchAction::Add { id } => {
            if !load_pool(settings)?.iter().any(|i| i.id == id) {
                bail!("No instrument with id '{}' in the catalog", id);
            }
            if !watchlist.contains(&id) {
                watchlist.push(id);
            }
        }
        WatchAction::Remove { id } => watchlist.retain(|w| *w != id),
    }
    store.save_watchlist(&watchlist)?;
    Ok(())
}

fn notifications_command(store: &LocalStore, action: NotificationAction) -> Result<()> {
    let mut center = NotificationCenter::new(store.notifications());
    match action {
        NotificationAction::List => {
            println!("Notifications ({} unread)", center.unread_count());
            if center.is_empty() {
                println!("No notifications");
            }
            let now = Utc::now();
            for n in center.iter() {
                println!(
                    "{} [{:?}] {} - {} ({}) {}",
                    if n.read { " " } else { "●" },
                    n.kind,
                    n.title,
                    n.message,
                    time_ago(now, n.timestamp),
                    n.id
                );
            }
            return Ok(());
        }
        NotificationAction::Add { kind, title, message } => {
            let id = center.push(kind, &title, &message);
            println!("{}", id);
        }
        NotificationAction::Read { id } => {
            if !center.mark_as_read(&id) {
                bail!("No notification with id '{}'", id);
            }
        }
        NotificationAction::Clear { id } => {
            if !center.clear(&id) {
                bail!("No notification with id '{}'", id);
            }
        }
    }
    store.save_notifications(&center.into_inner())?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_level.as_str()),
    )
    .init();

    let store = LocalStore::new(&settings.data_dir);
    log::debug!("Using data directory '{}'", store.dir().display());

    match cli.command {
        Command::Analyze {
            amount,
            kind,
            profile,
            currency,
        } => analyze(&settings, &store, &amount, kind, profile, currency).await,
        Command::Profile { action } => profile_command(&store, action),
        Command::Quiz { answers, billing } => quiz_command(&answers, billing),
        Command::Plans { billing } => {
            print_plans(billing, None);
            Ok(())
        }
        Command::Catalog => catalog_command(&settings, &store),
        Command::News => {
            news_command();
            Ok(())
        }
        Command::Watch { action } => watch_command(&settings, &store, action),
        Command::Notifications { action } => notifications_command(&store, action),
    }
}
