use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hireveu::config::{ClientConfig, ConfigError};
use hireveu::net::auth::AuthApi;
use hireveu::net::types::{BillingCycle, ProratedRequest, RegisterRequest};
use hireveu::net::{catalog, organizations, payments};
use hireveu::services::auth::{AuthService, LoginFailure, LoginForm};
use hireveu::services::bootstrap::Bootstrap;
use hireveu::services::guard::{GuardDecision, RouteGuard};
use hireveu::state::consent::{ConsentPreferences, ConsentStore};
use hireveu::state::pending::PendingVerification;
use hireveu::util::cancel::RequestScope;
use hireveu::util::storage::{FileStorage, KeyValueStorage, StorageError};
use hireveu::{ApiClient, ApiError, SessionStore};
use serde_json::Value;

/// Storage key for the session cookie carried between invocations.
const SESSION_COOKIE_KEY: &str = "sessionCookie";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    #[error("{0}")]
    Login(#[from] LoginFailure),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("not signed in; run `login`, pass --email/--password, or set HIREVEU_SESSION_COOKIE (would redirect to {0})")]
    NotSignedIn(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("interrupted")]
    Interrupted,
}

#[derive(Parser, Debug)]
#[command(name = "hireveu", about = "Hireveu learning platform client")]
struct Cli {
    #[arg(long, env = "HIREVEU_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "HIREVEU_STORAGE_PATH")]
    storage: Option<PathBuf>,

    /// Sign in with these credentials before running the command.
    #[arg(long, env = "HIREVEU_EMAIL")]
    email: Option<String>,

    #[arg(long, env = "HIREVEU_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// `Cookie` header value to resume a session with. Defaults to the cookie
    /// saved by the last `login`.
    #[arg(long, env = "HIREVEU_SESSION_COOKIE", hide_env_values = true)]
    session_cookie: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the session bootstrap and print the signed-in user.
    Whoami,
    Login,
    GoogleLogin {
        credential: String,
    },
    Logout,
    Register(RegisterArgs),
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        token: String,
        #[arg(long)]
        password: String,
    },
    Consent(ConsentCommand),
    Payments(PaymentsCommand),
    Org(OrgCommand),
    Problems,
    Quizzes,
    Internships,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    organization_code: Option<String>,
}

#[derive(Args, Debug)]
struct ConsentCommand {
    #[command(subcommand)]
    command: ConsentSubcommand,
}

#[derive(Subcommand, Debug)]
enum ConsentSubcommand {
    Show,
    Save {
        #[arg(long, default_value_t = false)]
        functional: bool,
        #[arg(long, default_value_t = false)]
        analytics: bool,
        #[arg(long, default_value_t = false)]
        marketing: bool,
    },
    AcceptAll,
    RejectAll,
}

#[derive(Args, Debug)]
struct PaymentsCommand {
    #[command(subcommand)]
    command: PaymentsSubcommand,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CycleArg {
    Monthly,
    Yearly,
}

impl From<CycleArg> for BillingCycle {
    fn from(arg: CycleArg) -> Self {
        match arg {
            CycleArg::Monthly => Self::Monthly,
            CycleArg::Yearly => Self::Yearly,
        }
    }
}

#[derive(Subcommand, Debug)]
enum PaymentsSubcommand {
    Key,
    History,
    Prorated {
        plan: String,
        #[arg(long, value_enum, default_value = "monthly")]
        cycle: CycleArg,
    },
    Receipt {
        payment_id: String,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct OrgCommand {
    #[command(subcommand)]
    command: OrgSubcommand,
}

#[derive(Subcommand, Debug)]
enum OrgSubcommand {
    Members { org_id: String },
    Team { org_id: String },
    Stats { org_id: String },
    Invites { org_id: String },
    Analytics { org_id: String },
}

struct CliContext {
    client: ApiClient,
    store: SessionStore,
    auth: AuthService,
    bootstrap: Bootstrap,
    guard: RouteGuard,
    consent: ConsentStore,
    scope: RequestScope,
    storage: Arc<dyn KeyValueStorage>,
    email: Option<String>,
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let ctx = build_context(&cli)?;

    tokio::select! {
        res = run(&ctx, cli.command) => res,
        _ = tokio::signal::ctrl_c() => {
            ctx.scope.cancel();
            Err(CliError::Interrupted)
        }
    }
}

fn build_context(cli: &Cli) -> Result<CliContext, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url)?;
    }
    if let Some(path) = &cli.storage {
        config.storage_path.clone_from(path);
    }

    let client = ApiClient::new(&config)?;
    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(config.storage_path.clone()));
    restore_session(&client, storage.as_ref(), cli.session_cookie.as_deref())?;
    let api: Arc<dyn AuthApi> = Arc::new(client.clone());
    let store = SessionStore::new();

    Ok(CliContext {
        auth: AuthService::new(api.clone(), store.clone(), PendingVerification::new(storage.clone()))
            .with_google_client_id(config.google_client_id.clone()),
        bootstrap: Bootstrap::new(api, store.clone(), config.auth_throttle),
        consent: ConsentStore::new(storage.clone()),
        storage,
        guard: RouteGuard::new(),
        scope: RequestScope::new(),
        client,
        store,
        email: cli.email.clone(),
        password: cli.password.clone(),
    })
}

/// An explicit cookie wins over the saved one. An unreadable store only costs
/// the saved session.
fn restore_session(client: &ApiClient, storage: &dyn KeyValueStorage, explicit: Option<&str>) -> Result<(), CliError> {
    let cookie = match explicit {
        Some(cookie) => Some(cookie.to_owned()),
        None => storage.get_item(SESSION_COOKIE_KEY).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read saved session cookie");
            None
        }),
    };
    if let Some(cookie) = cookie {
        client.restore_session_cookies(&cookie)?;
    }
    Ok(())
}

fn persist_session(ctx: &CliContext) -> Result<(), CliError> {
    match ctx.client.session_cookies() {
        Some(cookie) => ctx.storage.set_item(SESSION_COOKIE_KEY, &cookie)?,
        None => tracing::warn!("backend set no session cookie; the next run starts signed out"),
    }
    Ok(())
}

async fn run(ctx: &CliContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Whoami => run_whoami(ctx).await,
        Command::Login => {
            let user = sign_in(ctx).await?;
            println!("signed in as {} <{}>", user.name, user.email);
            Ok(())
        }
        Command::GoogleLogin { credential } => {
            let outcome = ctx.scope.run(async { Ok(ctx.auth.google_login(&credential).await) }).await??;
            persist_session(ctx)?;
            println!("signed in as {} <{}>", outcome.user.name, outcome.user.email);
            Ok(())
        }
        Command::Logout => {
            let route = ctx.auth.logout().await;
            ctx.storage.remove_item(SESSION_COOKIE_KEY)?;
            println!("signed out; navigate to {route}");
            Ok(())
        }
        Command::Register(args) => run_register(ctx, args).await,
        Command::ForgotPassword { email } => {
            let message = ctx.scope.run(ctx.auth.forgot_password(&email)).await?;
            println!("{}", message.unwrap_or_else(|| "If the account exists, a reset link was sent.".to_owned()));
            Ok(())
        }
        Command::ResetPassword { token, password } => {
            let message = ctx.scope.run(ctx.auth.reset_password(&token, &password)).await?;
            println!("{}", message.unwrap_or_else(|| "Password updated.".to_owned()));
            Ok(())
        }
        Command::Consent(consent) => run_consent(ctx, consent),
        Command::Payments(cmd) => run_payments(ctx, cmd).await,
        Command::Org(cmd) => run_org(ctx, cmd).await,
        Command::Problems => print_json(&ctx.scope.run(catalog::problems(&ctx.client)).await?),
        Command::Quizzes => print_json(&ctx.scope.run(catalog::quizzes(&ctx.client)).await?),
        Command::Internships => print_json(&ctx.scope.run(catalog::internships(&ctx.client)).await?),
    }
}

async fn sign_in(ctx: &CliContext) -> Result<hireveu::User, CliError> {
    let (Some(email), Some(password)) = (&ctx.email, &ctx.password) else {
        return Err(CliError::NotSignedIn("/login".to_owned()));
    };
    let mut form = LoginForm::new(email, password);
    let outcome = ctx.scope.run(async { Ok(ctx.auth.login(&mut form).await) }).await??;
    persist_session(ctx)?;
    Ok(outcome.user)
}

/// Establish a session for a protected route: explicit credentials win,
/// otherwise the bootstrap check decides.
async fn require_session(ctx: &CliContext, route: &str) -> Result<(), CliError> {
    if ctx.email.is_some() && ctx.password.is_some() {
        sign_in(ctx).await?;
    } else {
        ctx.bootstrap.run_once().await;
    }
    match ctx.guard.evaluate_store(&ctx.store, route) {
        GuardDecision::Allow => Ok(()),
        GuardDecision::Redirect(to) => Err(CliError::NotSignedIn(to)),
        GuardDecision::Loading => Err(CliError::NotSignedIn(route.to_owned())),
    }
}

async fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let user = if ctx.email.is_some() && ctx.password.is_some() {
        Some(sign_in(ctx).await?)
    } else {
        ctx.bootstrap.run_once().await.user
    };
    match user {
        Some(user) => print_json(&serde_json::to_value(&user)?),
        None => {
            println!("not signed in");
            Ok(())
        }
    }
}

async fn run_register(ctx: &CliContext, args: RegisterArgs) -> Result<(), CliError> {
    let req = RegisterRequest {
        name: args.name,
        username: args.username,
        email: args.email,
        password: args.password,
        organization_code: args.organization_code,
    };
    let resp = ctx.scope.run(ctx.auth.register(&req)).await?;
    println!(
        "{}",
        resp.message
            .unwrap_or_else(|| format!("registered {}; check your email to verify", resp.user.email))
    );
    Ok(())
}

fn run_consent(ctx: &CliContext, consent: ConsentCommand) -> Result<(), CliError> {
    let record = match consent.command {
        ConsentSubcommand::Show => {
            match ctx.consent.load() {
                Some(record) => print_json(&serde_json::to_value(&record)?)?,
                None => println!("no consent decision recorded"),
            }
            return Ok(());
        }
        ConsentSubcommand::Save { functional, analytics, marketing } => {
            ctx.consent
                .save(ConsentPreferences { essential: true, functional, analytics, marketing })?
        }
        ConsentSubcommand::AcceptAll => ctx.consent.accept_all()?,
        ConsentSubcommand::RejectAll => ctx.consent.reject_non_essential()?,
    };
    print_json(&serde_json::to_value(&record)?)
}

async fn run_payments(ctx: &CliContext, cmd: PaymentsCommand) -> Result<(), CliError> {
    require_session(ctx, "/payments").await?;
    match cmd.command {
        PaymentsSubcommand::Key => {
            let key = ctx.scope.run(payments::get_key(&ctx.client)).await?;
            println!("{}", key.key);
            Ok(())
        }
        PaymentsSubcommand::History => {
            let records = ctx.scope.run(payments::history(&ctx.client)).await?;
            for record in records {
                println!(
                    "{}\t{}\t{:.2}\t{}",
                    record.id,
                    record.plan.as_deref().unwrap_or("-"),
                    record.amount,
                    record.status.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        PaymentsSubcommand::Prorated { plan, cycle } => {
            let req = ProratedRequest { new_plan: plan, billing_cycle: cycle.into() };
            let quote = ctx.scope.run(payments::calculate_prorated(&ctx.client, &req)).await?;
            println!("prorated amount: {:.2}", quote.prorated_amount);
            if let Some(credit) = quote.credit {
                println!("credit applied: {credit:.2}");
            }
            Ok(())
        }
        PaymentsSubcommand::Receipt { payment_id, out } => {
            let bytes = ctx.scope.run(payments::receipt(&ctx.client, &payment_id)).await?;
            std::fs::write(&out, bytes)?;
            println!("receipt written to {}", out.display());
            Ok(())
        }
    }
}

async fn run_org(ctx: &CliContext, cmd: OrgCommand) -> Result<(), CliError> {
    require_session(ctx, "/organization").await?;
    let client = &ctx.client;
    match cmd.command {
        OrgSubcommand::Members { org_id } => {
            let members = ctx.scope.run(organizations::members(client, &org_id)).await?;
            for m in members {
                println!("{}\t{}\t{}\t{}", m.id, m.email, m.role, m.department.as_deref().unwrap_or("-"));
            }
            Ok(())
        }
        OrgSubcommand::Team { org_id } => {
            let team = ctx.scope.run(organizations::team(client, &org_id)).await?;
            for m in team {
                println!("{}\t{}\t{}", m.id, m.email, m.role);
            }
            Ok(())
        }
        OrgSubcommand::Stats { org_id } => print_json(&ctx.scope.run(organizations::stats(client, &org_id)).await?),
        OrgSubcommand::Invites { org_id } => {
            let invites = ctx.scope.run(organizations::invites(client, &org_id)).await?;
            for invite in invites {
                println!(
                    "{}\t{}\t{}\t{}",
                    invite.id,
                    invite.email,
                    invite.role,
                    invite.status.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        OrgSubcommand::Analytics { org_id } => {
            print_json(&ctx.scope.run(organizations::analytics(client, &org_id)).await?)
        }
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
