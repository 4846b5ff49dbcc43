use anyhow::Context;
use tracing::{info, warn};

use vantage_client::view::{Facet, ListFilter, SortOrder};
use vantage_client::{AppContext, ClientConfig, QueryState};
use vantage_types::api::LoginRequest;
use vantage_types::models::{Role, User};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vantage=debug,vantage_client=debug".into()),
        )
        .init();

    // Config
    let config = ClientConfig::from_env()?;
    let ctx = AppContext::from_config(config)?;

    // Session
    ctx.auth.init();
    let user = match ctx.auth.reconcile().await {
        Ok(Some(user)) => Some(user),
        Ok(None) => sign_in(&ctx).await?,
        Err(e) => {
            warn!("stored session rejected: {}", e);
            sign_in(&ctx).await?
        }
    };
    let Some(user) = user else {
        info!("not signed in; set VANTAGE_USERNAME and VANTAGE_PASSWORD to log in");
        return Ok(());
    };

    warm_dashboard(&ctx, &user).await;
    Ok(())
}

async fn sign_in(ctx: &AppContext) -> anyhow::Result<Option<User>> {
    let (Ok(username), Ok(password)) = (std::env::var("VANTAGE_USERNAME"), std::env::var("VANTAGE_PASSWORD"))
    else {
        return Ok(None);
    };
    let user = ctx
        .auth
        .login(&LoginRequest { username, password })
        .await
        .context("login failed")?;
    Ok(Some(user))
}

fn report<T>(name: &str, state: &QueryState<Vec<T>>) {
    match state {
        QueryState::Success(items) => info!("{}: {:?} ({} rows)", name, state.render_state(), items.len()),
        QueryState::Error(e) => warn!("{}: {:?} ({})", name, state.render_state(), e),
        _ => info!("{}: {:?}", name, state.render_state()),
    }
}

/// Mount the queries the user's landing page shows and log what each would render.
async fn warm_dashboard(ctx: &AppContext, user: &User) {
    info!("warming {:?} dashboard for {}", user.primary_role(), user.username);

    match user.primary_role() {
        Role::Admin | Role::Representative => {
            let companies = ctx.companies().settled().await;
            report("companies", &companies);
            if let Some(list) = companies.data() {
                let active = ListFilter::new()
                    .facet(Facet::Status, "active")
                    .sort(SortOrder::NameAsc)
                    .apply(list);
                info!("{} active companies", active.len());
            }
            report("investors", &ctx.investors().settled().await);
        }
        Role::FundManager => {
            report("funds", &ctx.funds().settled().await);
            report("benchmark", &ctx.benchmark().settled().await);
            report("top movers", &ctx.top_movers().settled().await);
        }
        Role::Investor => {
            let mut browser = ctx.campaign_browser();
            match browser.load_next().await {
                Ok(n) => info!("campaigns: {} loaded, more available: {}", n, browser.has_more()),
                Err(e) => warn!("campaigns: {}", e),
            }
            report("deals", &ctx.deals().settled().await);
        }
    }

    let refreshed = ctx.focus().await;
    info!("focus refetched {} queries", refreshed);
}
