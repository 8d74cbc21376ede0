use functions_core::lambda::init_tracing;
use lambda_http::{Error, Request, run, service_fn};
use send_email::MailerContext;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    info!("Starting send-email function");

    let ctx = MailerContext::from_env()?;

    run(service_fn(|event: Request| {
        let ctx = ctx.clone();
        async move { send_email::handler(ctx, event).await }
    }))
    .await
}
