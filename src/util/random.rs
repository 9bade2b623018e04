use rand::Rng;
#[cfg(test)] use std::sync::Mutex;


#[cfg(test)]
/// automock expectations for static methods are global - hold this lock to avoid races
pub static MOCK_RANDOM_MUTEX: Mutex<()> = Mutex::new(());

#[cfg_attr(test, mockall::automock)]
pub trait Random {
    /// next uniform value in [0.0, 1.0)
    fn uniform() -> f64;
}

pub struct RngRandom {}
impl Random for RngRandom {
    fn uniform() -> f64 {
        rand::thread_rng().gen_range(0.0..1.0)
    }
}
