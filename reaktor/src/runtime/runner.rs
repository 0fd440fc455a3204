/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Dedicated polling thread driving a set of nuklei.

use crate::nukleus::Nukleus;
use crate::observability::{events, fields};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

const COMPONENT: &str = "runner";

// Linux caps thread names at 15 bytes plus the terminator.
const MAX_THREAD_NAME_LEN: usize = 15;

// Spin politely for a while before conceding the core.
const IDLE_SPIN_PASSES: u32 = 64;
const IDLE_BACKOFF: Duration = Duration::from_micros(100);

/// Owns one OS thread that repeatedly offers a turn to each nukleus.
///
/// A failed turn is fatal to the whole runner; every nukleus is still
/// closed on the way out. Stopping is cooperative and observed between
/// passes.
pub struct NukleusRunner {
    name: String,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl NukleusRunner {
    pub fn spawn(name: &str, nuklei: Vec<Box<dyn Nukleus + Send>>) -> io::Result<Self> {
        let thread_name = if name.len() <= MAX_THREAD_NAME_LEN {
            name.to_string()
        } else {
            warn!(
                event = events::RUNNER_THREAD_NAME_FALLBACK,
                component = COMPONENT,
                nukleus = name,
                "name too long for an OS thread name"
            );
            fields::DEFAULT_RUNNER_THREAD.to_string()
        };

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let runner_name = name.to_string();
        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn(move || run_loop(&runner_name, nuklei, &stop_flag))?;

        info!(
            event = events::RUNNER_SPAWN_OK,
            component = COMPONENT,
            nukleus = name,
            "runner started"
        );

        Ok(Self {
            name: name.to_string(),
            stop,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requests a cooperative stop without waiting for it.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Stops the runner and waits for the polling thread to exit.
    pub fn shutdown(mut self) -> thread::Result<()> {
        self.stop();
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

impl Drop for NukleusRunner {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_loop(name: &str, mut nuklei: Vec<Box<dyn Nukleus + Send>>, stop: &AtomicBool) {
    let mut idle_passes = 0u32;

    'turns: while !stop.load(Ordering::Acquire) {
        let mut worked = 0usize;

        for nukleus in &mut nuklei {
            match nukleus.process() {
                Ok(count) => worked += count,
                Err(err) => {
                    warn!(
                        event = events::RUNNER_TURN_FAILED,
                        component = COMPONENT,
                        runner = name,
                        nukleus = nukleus.name(),
                        thread = fields::current_thread_name_or_default().as_str(),
                        err = %err,
                        "turn failed, runner stopping"
                    );
                    break 'turns;
                }
            }
        }

        if worked == 0 {
            idle_passes = idle_passes.saturating_add(1);
            if idle_passes <= IDLE_SPIN_PASSES {
                thread::yield_now();
            } else {
                thread::sleep(IDLE_BACKOFF);
            }
        } else {
            idle_passes = 0;
        }
    }

    for nukleus in &mut nuklei {
        if let Err(err) = nukleus.close() {
            warn!(
                event = events::RUNNER_CLOSE_FAILED,
                component = COMPONENT,
                runner = name,
                nukleus = nukleus.name(),
                err = %err,
                "close failed during teardown"
            );
        }
    }

    debug!(
        event = events::RUNNER_STOPPED,
        component = COMPONENT,
        runner = name,
        "runner stopped"
    );
}

#[cfg(test)]
mod tests {
    use super::NukleusRunner;
    use crate::error::BoxError;
    use crate::nukleus::Nukleus;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    struct Probe {
        turns: Arc<AtomicUsize>,
        closed: Arc<AtomicBool>,
        fail_after: Option<usize>,
    }

    impl Nukleus for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn process(&mut self) -> Result<usize, BoxError> {
            let turn = self.turns.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(limit) = self.fail_after {
                if turn > limit {
                    return Err("probe budget exhausted".into());
                }
            }
            Ok(1)
        }

        fn close(&mut self) -> Result<(), BoxError> {
            self.closed.store(true, Ordering::Release);
            Ok(())
        }
    }

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        done()
    }

    #[test]
    fn runner_offers_turns_until_shutdown_then_closes() {
        let turns = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicBool::new(false));
        let probe = Probe {
            turns: turns.clone(),
            closed: closed.clone(),
            fail_after: None,
        };

        let runner = NukleusRunner::spawn("probe-runner", vec![Box::new(probe)]).unwrap();
        assert!(wait_until(Duration::from_secs(5), || {
            turns.load(Ordering::Relaxed) > 0
        }));

        runner.shutdown().unwrap();
        assert!(closed.load(Ordering::Acquire));
    }

    #[test]
    fn failed_turn_stops_the_runner_but_still_closes() {
        let turns = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicBool::new(false));
        let probe = Probe {
            turns: turns.clone(),
            closed: closed.clone(),
            fail_after: Some(3),
        };

        let runner = NukleusRunner::spawn("probe-runner", vec![Box::new(probe)]).unwrap();
        assert!(wait_until(Duration::from_secs(5), || {
            closed.load(Ordering::Acquire)
        }));

        runner.shutdown().unwrap();
    }

    #[test]
    fn overlong_names_still_spawn() {
        let turns = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicBool::new(false));
        let probe = Probe {
            turns,
            closed,
            fail_after: None,
        };

        let runner = NukleusRunner::spawn(
            "a-runner-name-well-past-any-kernel-limit",
            vec![Box::new(probe)],
        )
        .unwrap();
        assert_eq!(runner.name(), "a-runner-name-well-past-any-kernel-limit");
        runner.shutdown().unwrap();
    }
}
