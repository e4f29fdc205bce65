//! Cross-crate scenarios for the frame pipeline.

#[cfg(test)]
mod backpressure;

#[cfg(test)]
mod end_to_end;

#[cfg(test)]
mod shutdown;

#[cfg(test)]
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
