use std::future;
use std::time::Duration;

use tokio::time::Instant;

/// Подавляет быстро меняющееся значение до «тишины»: наружу уходит только
/// последнее значение, ровно один раз, спустя задержку после последнего
/// изменения. Каждый [`update`](Self::update) перезапускает таймер и
/// вытесняет ещё не отданное значение.
///
/// Рассчитан на однопоточный select-цикл:
///
/// ```ignore
/// loop {
///     tokio::select! {
///         Some(term) = input.recv() => debouncer.update(term),
///         term = debouncer.settled() => apply_filter(&term),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            deadline: None,
        }
    }

    /// Запоминает новое значение и перезапускает период тишины.
    pub fn update(&mut self, value: T) {
        self.pending = Some(value);
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Есть ли значение, ожидающее отдачи.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Ждёт окончания периода тишины и отдаёт последнее значение.
    /// Без ожидающего значения никогда не завершается — удобно
    /// в `select!`, где будущее пересоздаётся на каждой итерации.
    pub async fn settled(&mut self) -> T {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
                match self.pending.take() {
                    Some(value) => value,
                    None => future::pending().await,
                }
            }
            None => future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{Instant, advance, timeout};

    use super::Debouncer;

    const DELAY: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn propagates_value_after_quiet_period() {
        let mut debouncer = Debouncer::new(DELAY);
        let started = Instant::now();

        debouncer.update("sunset");
        let value = debouncer.settled().await;

        assert_eq!(value, "sunset");
        assert_eq!(started.elapsed(), DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_updates_propagate_only_final_value() {
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.update("s");
        advance(Duration::from_millis(100)).await;
        debouncer.update("su");
        advance(Duration::from_millis(100)).await;
        debouncer.update("sun");

        let last_change = Instant::now();
        let value = debouncer.settled().await;

        assert_eq!(value, "sun");
        assert_eq!(last_change.elapsed(), DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn each_update_resets_the_timer() {
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.update("a");
        advance(Duration::from_millis(200)).await;
        debouncer.update("b");

        // до конца нового периода тишины значение не отдаётся
        let not_ready = timeout(Duration::from_millis(200), debouncer.settled()).await;
        assert!(not_ready.is_err());

        let value = debouncer.settled().await;
        assert_eq!(value, "b");
    }

    #[tokio::test(start_paused = true)]
    async fn value_is_delivered_exactly_once() {
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.update("only");
        let value = debouncer.settled().await;
        assert_eq!(value, "only");
        assert!(!debouncer.is_pending());

        let second = timeout(Duration::from_secs(5), debouncer.settled()).await;
        assert!(second.is_err());
    }
}
