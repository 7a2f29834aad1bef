use anyhow::Result;

/// Every prompt suspends the only task, so a current thread runtime is all the session needs.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
