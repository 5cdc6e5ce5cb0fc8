use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dojo_actions::{Lifecycle, NoticeSlot};
use dojo_api::{Client, HttpTransport, NormalizedError};
use dojo_console::{
    ConsoleConfig, Endpoints, GenerateOutcome, GroupRoster, ReportScreen, ReportView,
    UserDirectory,
};
use dojo_protocol::{EntityKind, ReportRow, Role, SolutionType};
use dojo_report::RowFilter;

#[derive(Parser)]
#[command(name = "dojo-console")]
#[command(about = "Admin console core for the dojo challenge platform", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a JSON or TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token for the admin session
    #[arg(long, global = true, env = "DOJO_TOKEN")]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a submission report and print it
    Report(ReportArgs),
    /// List platform accounts
    Users(UsersArgs),
    /// Show one group's members and outstanding invites
    Roster(RosterArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// Challenge to report on
    #[arg(long)]
    challenge: i64,

    /// Range start, ISO-8601, inclusive
    #[arg(long)]
    from: Option<String>,

    /// Range end, ISO-8601, inclusive
    #[arg(long)]
    to: Option<String>,

    /// Keep only user or group rows
    #[arg(long, value_enum)]
    entity: Option<EntityArg>,

    /// Keep only rows with this solution form
    #[arg(long, value_enum)]
    solution: Option<SolutionArg>,

    /// Keep rows whose latest status on either track matches
    #[arg(long)]
    status: Option<String>,

    /// Case-insensitive name search
    #[arg(long)]
    search: Option<String>,

    /// Print the drill-down for one row id
    #[arg(long)]
    row: Option<String>,

    /// Emit the whole view as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct UsersArgs {
    /// Case-insensitive username/email search
    #[arg(long)]
    search: Option<String>,

    /// Emit the list as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RosterArgs {
    /// Group to show
    #[arg(long)]
    group: i64,

    /// Emit members and invites as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum EntityArg {
    User,
    Group,
}

impl EntityArg {
    fn into_kind(self) -> EntityKind {
        match self {
            EntityArg::User => EntityKind::User,
            EntityArg::Group => EntityKind::Group,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SolutionArg {
    Flag,
    Procedure,
    Both,
}

impl SolutionArg {
    fn into_type(self) -> SolutionType {
        match self {
            SolutionArg::Flag => SolutionType::Flag,
            SolutionArg::Procedure => SolutionType::Procedure,
            SolutionArg::Both => SolutionType::FlagAndProcedure,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let json_output = match &cli.command {
        Commands::Report(args) => args.json,
        Commands::Users(args) => args.json,
        Commands::Roster(args) => args.json,
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet || json_output {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::from_path(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }

    let mut transport = HttpTransport::new(&config.base_url, config.request_timeout)
        .context("build HTTP transport")?;
    if let Some(token) = cli.token {
        transport = transport.with_token(token);
    }
    let endpoints = Endpoints::new(Client::new(Arc::new(transport)));

    let session = endpoints.session().await?;
    log::info!("signed in as {} ({})", session.username, session.role);

    match cli.command {
        Commands::Report(args) => run_report(args, endpoints, &config).await,
        Commands::Users(args) => run_users(args, endpoints, &config, session.role).await,
        Commands::Roster(args) => run_roster(args, endpoints, &config, session.role).await,
    }
}

async fn run_report(args: ReportArgs, endpoints: Endpoints, config: &ConsoleConfig) -> Result<()> {
    let notices = NoticeSlot::new(config.notice_ttl);
    let mut screen = ReportScreen::new(endpoints, notices, Lifecycle::mounted());

    let outcome = screen
        .generate(args.challenge, args.from.clone(), args.to.clone())
        .await;
    screen.set_filter(RowFilter {
        entity: args.entity.map(EntityArg::into_kind),
        solution: args.solution.map(SolutionArg::into_type),
        status: args.status.clone(),
        search: args.search.clone(),
    });
    if let Some(row_id) = &args.row {
        screen.select(row_id.clone());
    }

    let view = screen.view();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_report(&view, config.page_size);
    }

    match outcome {
        GenerateOutcome::Ready => Ok(()),
        GenerateOutcome::Invalid | GenerateOutcome::Failed => Err(anyhow!(view
            .error
            .map_or_else(|| "report generation failed".to_string(), |e| e.message))),
        GenerateOutcome::InFlight | GenerateOutcome::Detached => Ok(()),
    }
}

async fn run_users(
    args: UsersArgs,
    endpoints: Endpoints,
    config: &ConsoleConfig,
    role: Role,
) -> Result<()> {
    let directory = UserDirectory::new(
        endpoints,
        role,
        NoticeSlot::new(config.notice_ttl),
        Lifecycle::mounted(),
    );
    directory.load().await?;

    let users = match &args.search {
        Some(query) => directory.search(query),
        None => directory.users(),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }
    println!("{} accounts", users.len());
    for user in users.iter().take(config.page_size) {
        println!(
            "  {:>6}  {:<20}  {:<30}  {:<9}  {}",
            user.id,
            user.username,
            user.email,
            user.role.as_str(),
            if user.active { "active" } else { "inactive" }
        );
    }
    if users.len() > config.page_size {
        println!("  ... {} more", users.len() - config.page_size);
    }
    Ok(())
}

async fn run_roster(
    args: RosterArgs,
    endpoints: Endpoints,
    config: &ConsoleConfig,
    role: Role,
) -> Result<()> {
    let roster = GroupRoster::new(
        endpoints,
        args.group,
        role,
        NoticeSlot::new(config.notice_ttl),
        Lifecycle::mounted(),
    );
    roster.load().await?;

    if args.json {
        let payload = serde_json::json!({
            "members": roster.members(),
            "invites": roster.invites(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    println!("group {} members:", args.group);
    for member in roster.members() {
        println!(
            "  {:>6}  {:<20}  {:?}  joined {}",
            member.id,
            member.username,
            member.rank,
            member.joined_at.as_deref().unwrap_or("-")
        );
    }
    let invites = roster.invites();
    if invites.is_empty() {
        println!("no outstanding invites");
    } else {
        println!("outstanding invites:");
        for invite in invites {
            println!(
                "  {:>6}  {:<30}  sent {}",
                invite.id,
                invite.email,
                invite.created_at.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(())
}

fn print_report(view: &ReportView, page_size: usize) {
    let Some(challenge) = &view.challenge else {
        println!("no report");
        if let Some(error) = &view.error {
            print_error(error);
        }
        return;
    };

    println!(
        "# {} (challenge {}, {})",
        challenge.title, challenge.id, challenge.solution_type
    );
    println!(
        "rows: {} of {}   avg total: {}   avg flag: {}   avg procedure: {}",
        view.rows.len(),
        view.total,
        view.aggregates.avg_total,
        view.aggregates.avg_flag,
        view.aggregates.avg_procedure
    );
    if !view.unique_statuses.is_empty() {
        println!("statuses: {}", view.unique_statuses.join(", "));
    }
    for row in view.rows.iter().take(page_size) {
        print_row(row);
    }
    if view.rows.len() > page_size {
        println!("  ... {} more rows", view.rows.len() - page_size);
    }
    if let Some(selected) = &view.selected {
        print_detail(selected);
    }
    if let Some(error) = &view.error {
        print_error(error);
    }
}

fn print_row(row: &ReportRow) {
    println!(
        "  {:<24} [{}]  flag {:>5.0} ({})  procedure {:>5.0} ({})  total {:>6.0}  {}",
        row.entity.display_name(),
        row.entity.kind(),
        row.summary.flag.best_score,
        row.summary.flag.latest_status.as_deref().unwrap_or("-"),
        row.summary.procedure.best_score,
        row.summary.procedure.latest_status.as_deref().unwrap_or("-"),
        row.summary.total_score,
        row.summary.date.as_deref().unwrap_or("-")
    );
}

fn print_detail(row: &ReportRow) {
    println!("\ndetail for {} ({}):", row.entity.display_name(), row.row_id);
    match &row.see_more.correct_solution {
        Some(solution) => println!("  correct solution: {solution}"),
        None => println!("  correct solution: (hidden)"),
    }
    for attempt in row
        .see_more
        .attempts
        .flag
        .iter()
        .chain(&row.see_more.attempts.procedure)
    {
        let submitter = attempt
            .submitted_by
            .as_ref()
            .and_then(|s| s.username.as_deref())
            .unwrap_or("-");
        println!(
            "  {:?} at {}  status {}  score {:.0}  by {}",
            attempt.kind,
            attempt.submitted_at,
            attempt.status.as_deref().unwrap_or("-"),
            attempt.score,
            submitter
        );
    }
}

fn print_error(error: &NormalizedError) {
    log::error!("{}", error.message);
    for message in &error.messages {
        if message != &error.message {
            log::error!("  - {message}");
        }
    }
}
