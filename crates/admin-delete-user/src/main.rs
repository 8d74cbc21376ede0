use admin_delete_user::AdminContext;
use functions_core::lambda::init_tracing;
use lambda_http::{Error, Request, run, service_fn};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    info!("Starting admin-delete-user function");

    // Firebase Admin is initialized once, before the first invocation
    let ctx = AdminContext::from_env().await?;

    run(service_fn(|event: Request| {
        let ctx = ctx.clone();
        async move { admin_delete_user::handler(ctx, event).await }
    }))
    .await
}
