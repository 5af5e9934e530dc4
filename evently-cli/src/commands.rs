use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use evently_client::{require_role, ApiClient};
use evently_core::forms::{LoginForm, SignupForm};
use evently_core::{Availability, Role, Route};
use evently_dashboard::{AdminOverview, EventReport, ManagerDashboard, SourceFailure};
use evently_qr::feedback::FeedbackScreen;
use evently_qr::result::ScanResultView;
use evently_qr::{
    CheckInVerifier, QrDisplay, QrScanner, ScanError, ScanSession, ScanStatus, StallGateVerifier,
};
use evently_registration::{RegistrationOrchestrator, RegistrationOutcome};
use evently_shared::models::{NewEvent, NewSchool, NewStall, NewVolunteer};
use evently_store::{Config, FileBackend, Session};
use serde_json::Value;
use tokio::io::{BufReader, Stdin};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, Command, CreateCommand, DashboardCommand, ModerateCommand, ScanCommand, SignupArgs};
use crate::devices::{LineCamera, LineInput, LinePaymentWidget};

type StdinInput = LineInput<BufReader<Stdin>>;

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let session = Session::open(Arc::new(FileBackend::new(&config.session.path)))
        .with_context(|| format!("Failed to open session at {}", config.session.path.display()))?;
    let client = ApiClient::from_config(&config.api, session)?;
    let app = App {
        config,
        client,
        input: LineInput::stdin(),
    };

    match cli.command {
        Command::Login {
            role,
            email,
            password,
        } => app.login(role, email, password).await,
        Command::Logout { role, all } => app.logout(role, all),
        Command::Signup(args) => app.signup(args).await,
        Command::Theme { theme } => {
            let session = app.client.session();
            if let Some(theme) = theme {
                session.set_theme(theme)?;
            }
            println!("{:?}", session.theme());
            Ok(())
        }
        Command::Qr => app.show_qr().await,
        Command::Scan(ScanCommand::CheckIn) => app.check_in_desk().await,
        Command::Scan(ScanCommand::Stall) => app.stall_feedback().await,
        Command::Events => app.events().await,
        Command::Register { event_id } => app.register(&event_id).await,
        Command::Moderate(cmd) => app.moderate(cmd).await,
        Command::Dashboard(DashboardCommand::Admin) => app.admin_dashboard().await,
        Command::Dashboard(DashboardCommand::Manager) => app.manager_dashboard().await,
        Command::Report { event_id } => app.report(&event_id).await,
        Command::Create(cmd) => app.create(cmd).await,
    }
}

struct App {
    config: Config,
    client: ApiClient,
    input: StdinInput,
}

impl App {
    /// The role's pages only render with a stored token
    fn guard(&self, role: Role) -> Result<()> {
        require_role(self.client.session(), role)
            .map_err(|route| anyhow!("Not logged in as {}. Log in first ({})", role, route))
    }

    // ========================================================================
    // Session
    // ========================================================================

    async fn login(&self, role: Role, email: String, password: String) -> Result<()> {
        self.client.login(role, LoginForm::new(email, password)).await?;
        println!("Logged in as {} ({})", role, Route::Dashboard(role));
        Ok(())
    }

    fn logout(&self, role: Option<Role>, all: bool) -> Result<()> {
        match role {
            Some(role) if !all => {
                self.client.logout(role)?;
                println!("Logged out of {}", role);
            }
            _ => {
                self.client.session().clear_all()?;
                println!("Logged out of every role");
            }
        }
        Ok(())
    }

    async fn signup(&self, args: SignupArgs) -> Result<()> {
        let form = SignupForm {
            name: args.name,
            email: args.email,
            password: args.password,
            confirm_password: args.confirm_password,
            school_id: args.school_id,
        };
        self.client.signup(&form).await?;
        println!("Account created, logged in as student");
        Ok(())
    }

    // ========================================================================
    // QR flows
    // ========================================================================

    async fn show_qr(&self) -> Result<()> {
        self.guard(Role::Student)?;
        let display = QrDisplay::start(Arc::new(self.client.clone()), &self.config.qr);
        let mut frames = display.frames();
        let cancel = interrupt_token();
        let mut shown_payload: Option<String> = None;

        loop {
            let frame = frames.borrow_and_update().clone();
            if let Some(route) = frame.redirect {
                display.stop().await;
                bail!("Session expired, log in again ({})", route);
            }
            match &frame.credential {
                Some(credential)
                    if shown_payload.as_deref() != Some(credential.encoded_payload.as_str()) =>
                {
                    println!("QR: {}", credential.encoded_payload);
                    shown_payload = Some(credential.encoded_payload.clone());
                }
                Some(_) => {}
                None => shown_payload = None,
            }
            println!("{}", frame.state.label());

            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = frames.changed() => if changed.is_err() { break },
            }
        }

        display.stop().await;
        Ok(())
    }

    async fn check_in_desk(&self) -> Result<()> {
        self.guard(Role::Volunteer)?;
        let camera = Arc::new(LineCamera::new(self.input.clone()));
        let cancel = interrupt_token();

        loop {
            let mut session = ScanSession::new(
                QrScanner::new(camera.clone()),
                CheckInVerifier::new(self.client.clone()),
                &self.config.scanner,
            );
            let printer = tokio::spawn(print_status(session.status()));
            let outcome = session.run(&cancel).await;
            drop(session);
            let _ = printer.await;

            let route = match outcome {
                Ok(route) => route,
                Err(ScanError::Cancelled) => return Ok(()),
                Err(e @ ScanError::SessionExpired { .. }) => return Err(session_expired(e)),
                Err(e) => return Err(e.into()),
            };

            let view = ScanResultView::from_route(route, &self.config.scanner)
                .ok_or_else(|| anyhow!("Check-in did not return a scan result"))?;
            println!("{}", view.headline());
            for (label, value) in view.details() {
                println!("  {:<13} {}", label, value);
            }
            println!("Back to scanner in {}s", view.return_after().as_secs());

            if view.auto_return(&cancel).await.is_none() {
                return Ok(());
            }
        }
    }

    async fn stall_feedback(&self) -> Result<()> {
        self.guard(Role::Student)?;
        let camera = Arc::new(LineCamera::new(self.input.clone()));
        let mut session = ScanSession::new(
            QrScanner::new(camera),
            StallGateVerifier::new(self.client.clone()),
            &self.config.scanner,
        );
        let printer = tokio::spawn(print_status(session.status()));
        let outcome = session.run(&interrupt_token()).await;
        drop(session);
        let _ = printer.await;

        let route = match outcome {
            Ok(route) => route,
            Err(ScanError::Cancelled) => return Ok(()),
            Err(e @ ScanError::SessionExpired { .. }) => return Err(session_expired(e)),
            Err(e) => return Err(e.into()),
        };
        let mut screen = FeedbackScreen::from_route(route)
            .ok_or_else(|| anyhow!("Stall check did not unlock feedback"))?;
        println!("Rate {}", screen.stall().name);

        loop {
            let Some(line) = self.input.prompt("Rating (1-5):").await? else {
                return Ok(());
            };
            match line.parse::<i64>() {
                Ok(rating) => screen.set_rating(rating),
                Err(_) => {
                    eprintln!("Rating must be a whole number");
                    continue;
                }
            }
            if screen.can_submit() {
                break;
            }
            eprintln!("Rating must be between 1 and 5");
        }
        if let Some(comment) = self.input.prompt("Comment (optional):").await? {
            screen.set_comment(comment);
        }

        let route = screen.submit(&self.client).await?;
        println!("Thanks for your feedback! ({})", route);
        Ok(())
    }

    // ========================================================================
    // Events and registration
    // ========================================================================

    async fn events(&self) -> Result<()> {
        self.guard(Role::Student)?;
        for event in self.client.list_events().await? {
            let fee = if event.is_paid() {
                format!("fee {}", event.registration_fee)
            } else {
                "free".to_string()
            };
            println!(
                "{:<12} {:<32} {:<18} {}",
                event.id,
                event.title,
                Availability::of(&event).label(),
                fee
            );
        }
        Ok(())
    }

    async fn register(&self, event_id: &str) -> Result<()> {
        self.guard(Role::Student)?;
        let orchestrator = RegistrationOrchestrator::new(
            self.client.clone(),
            Arc::new(LinePaymentWidget::new(self.input.clone())),
        );

        match orchestrator.register(event_id).await? {
            RegistrationOutcome::Registered(reg) => println!(
                "Registered: {:?}, payment {:?}",
                reg.registration_status, reg.payment_status
            ),
            RegistrationOutcome::Reconciled(Some(reg)) => println!(
                "Payment window closed. Current registration: {:?}, payment {:?}",
                reg.registration_status, reg.payment_status
            ),
            RegistrationOutcome::Reconciled(None) => {
                println!("Payment window closed. You are not registered for this event.")
            }
        }
        Ok(())
    }

    // ========================================================================
    // Admin and event manager
    // ========================================================================

    async fn moderate(&self, cmd: ModerateCommand) -> Result<()> {
        self.guard(Role::Admin)?;
        let message = match cmd {
            ModerateCommand::Approve { event_id } => self.client.approve_event(&event_id).await?,
            ModerateCommand::Reject { event_id, reason } => {
                self.client.reject_event(&event_id, &reason).await?
            }
        };
        println!("{}", message.unwrap_or_else(|| "Done".to_string()));
        Ok(())
    }

    async fn admin_dashboard(&self) -> Result<()> {
        self.guard(Role::Admin)?;
        let overview = AdminOverview::load(&self.client).await;
        warn_failures(&overview.failures);
        print_json(&overview.stats())?;
        for event in overview.pending() {
            println!("Awaiting approval: {} ({})", event.title, event.id);
        }
        Ok(())
    }

    async fn manager_dashboard(&self) -> Result<()> {
        self.guard(Role::EventManager)?;
        let dashboard = ManagerDashboard::load(&self.client).await;
        warn_failures(&dashboard.failures);
        print_json(&dashboard.stats())?;
        for (title, reason) in dashboard.rejections() {
            println!("Rejected: {} ({})", title, reason);
        }
        Ok(())
    }

    async fn report(&self, event_id: &str) -> Result<()> {
        self.guard(Role::Admin)?;
        let report = EventReport::load(&self.client, event_id).await;
        warn_failures(&report.failures);
        print_json(&report.stats())?;
        for name in report.school_names() {
            println!("  {}", name);
        }
        Ok(())
    }

    async fn create(&self, cmd: CreateCommand) -> Result<()> {
        let created: Value = match cmd {
            CreateCommand::School { name } => {
                self.guard(Role::Admin)?;
                serde_json::to_value(self.client.create_school(&NewSchool { name }).await?)?
            }
            CreateCommand::Volunteer {
                name,
                email,
                event_id,
            } => {
                self.guard(Role::Admin)?;
                let volunteer = NewVolunteer {
                    name,
                    email,
                    event_id,
                };
                serde_json::to_value(self.client.create_volunteer(&volunteer).await?)?
            }
            CreateCommand::Event {
                title,
                venue,
                starts_at,
                max_capacity,
                fee,
                description,
            } => {
                self.guard(Role::EventManager)?;
                let event = NewEvent {
                    title,
                    venue,
                    starts_at,
                    max_capacity,
                    registration_fee: fee,
                    description,
                };
                serde_json::to_value(self.client.create_event(&event).await?)?
            }
            CreateCommand::Stall {
                name,
                event_id,
                school_id,
            } => {
                self.guard(Role::EventManager)?;
                let stall = NewStall {
                    name,
                    event_id,
                    school_id,
                };
                serde_json::to_value(self.client.create_stall(&stall).await?)?
            }
        };
        print_json(&created)
    }
}

/// Cancelled on Ctrl-C
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    cancel
}

async fn print_status(mut status: watch::Receiver<ScanStatus>) {
    while status.changed().await.is_ok() {
        let current = status.borrow_and_update().clone();
        match current {
            ScanStatus::Scanning => println!("Scanning... enter a QR payload"),
            ScanStatus::Verifying => println!("Verifying..."),
            ScanStatus::Rejected(message) => eprintln!("✗ {}", message),
            ScanStatus::Idle => {}
        }
    }
}

fn session_expired(err: ScanError) -> anyhow::Error {
    match err {
        ScanError::SessionExpired { redirect } => {
            anyhow!("Session expired, log in again ({})", redirect)
        }
        other => other.into(),
    }
}

fn warn_failures(failures: &[SourceFailure]) {
    for failure in failures {
        eprintln!("warning: {} unavailable: {}", failure.source, failure.error);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
