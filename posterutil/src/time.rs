use std::sync::mpsc::Sender;
use std::time::Instant;

use crate::{prettyprint_usize, Cancellation, Parallelism, PROGRESS_FREQUENCY_SECONDS};

pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

pub fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}

/// Something a long-running stage wants to tell whoever is watching.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressEvent {
    pub stage: String,
    /// From 0 to 1
    pub fraction: f64,
    pub warning: Option<String>,
}

/// Receives structured progress from a `Timer`, in addition to the log.
pub trait ProgressSink {
    fn event(&mut self, event: ProgressEvent);
}

impl ProgressSink for Sender<ProgressEvent> {
    fn event(&mut self, event: ProgressEvent) {
        // Nobody listening anymore is fine
        let _ = self.send(event);
    }
}

struct Progress {
    label: String,
    processed_items: usize,
    total_items: usize,
    started_at: Instant,
    last_printed_at: Instant,
}

impl Progress {
    fn new(label: &str, total_items: usize) -> Progress {
        Progress {
            label: label.to_string(),
            processed_items: 0,
            total_items,
            started_at: Instant::now(),
            last_printed_at: Instant::now(),
        }
    }

    // Returns when done
    fn next<'a>(
        &mut self,
        maybe_sink: &mut Option<Box<dyn ProgressSink + 'a>>,
    ) -> Option<(f64, String)> {
        self.processed_items += 1;
        if self.processed_items > self.total_items {
            panic!(
                "{} is too few items for {} progress",
                prettyprint_usize(self.total_items),
                self.label
            );
        }

        if self.processed_items == self.total_items {
            let elapsed = elapsed_seconds(self.started_at);
            let line = format!(
                "{} ({})... {}",
                self.label,
                prettyprint_usize(self.total_items),
                prettyprint_time(elapsed)
            );
            info!("{}", line);
            send(maybe_sink, &self.label, 1.0, None);
            return Some((elapsed, line));
        } else if elapsed_seconds(self.last_printed_at) >= PROGRESS_FREQUENCY_SECONDS {
            self.last_printed_at = Instant::now();
            info!(
                "{}: {}/{}... {}",
                self.label,
                prettyprint_usize(self.processed_items),
                prettyprint_usize(self.total_items),
                prettyprint_time(elapsed_seconds(self.started_at))
            );
            send(
                maybe_sink,
                &self.label,
                (self.processed_items as f64) / (self.total_items as f64),
                None,
            );
        }
        None
    }
}

fn send<'a>(
    maybe_sink: &mut Option<Box<dyn ProgressSink + 'a>>,
    stage: &str,
    fraction: f64,
    warning: Option<String>,
) {
    if let Some(ref mut sink) = maybe_sink {
        sink.event(ProgressEvent {
            stage: stage.to_string(),
            fraction,
            warning,
        });
    }
}

enum StackEntry {
    TimerSpan(TimerSpan),
    Progress(Progress),
}

struct TimerSpan {
    name: String,
    started_at: Instant,
    nested_results: Vec<String>,
    nested_time: f64,
}

/// Hierarchial magic. Spans nest with `start` and `stop`, loops report with `start_iter` and
/// `next`. When the outermost span ends, a summary of everything is logged.
pub struct Timer<'a> {
    results: Vec<String>,
    stack: Vec<StackEntry>,

    outermost_name: String,

    warnings: Vec<String>,

    sink: Option<Box<dyn ProgressSink + 'a>>,
}

impl<'a> Timer<'a> {
    pub fn new<S: Into<String>>(name: S) -> Timer<'a> {
        Timer::with_maybe_sink(name.into(), None)
    }

    pub fn new_with_sink<S: Into<String>>(name: S, sink: Box<dyn ProgressSink + 'a>) -> Timer<'a> {
        Timer::with_maybe_sink(name.into(), Some(sink))
    }

    fn with_maybe_sink(name: String, sink: Option<Box<dyn ProgressSink + 'a>>) -> Timer<'a> {
        let mut t = Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: name.clone(),
            warnings: Vec::new(),
            sink,
        };
        t.start(name);
        t
    }

    pub fn throwaway() -> Timer<'a> {
        Timer::new("throwaway")
    }

    /// Logs immediately, forwards to the sink, and repeats in the summary at the end.
    pub fn warn(&mut self, line: String) {
        warn!("{}", line);
        let stage = self.current_stage();
        let fraction = self.current_fraction();
        send(&mut self.sink, &stage, fraction, Some(line.clone()));
        self.warnings.push(line);
    }

    pub fn warnings(&self) -> &Vec<String> {
        &self.warnings
    }

    pub fn start<S: Into<String>>(&mut self, raw_name: S) {
        let name = raw_name.into();
        info!("{}...", name);
        send(&mut self.sink, &name, 0.0, None);
        self.stack.push(StackEntry::TimerSpan(TimerSpan {
            name,
            started_at: Instant::now(),
            nested_results: Vec::new(),
            nested_time: 0.0,
        }));
    }

    pub fn stop<S: Into<String>>(&mut self, raw_name: S) {
        let name = raw_name.into();
        let span = match self.stack.pop() {
            Some(StackEntry::TimerSpan(s)) => s,
            _ => panic!("Timer::stop({}) without a matching span on top of the stack", name),
        };
        assert_eq!(span.name, name);
        let elapsed = elapsed_seconds(span.started_at);
        let line = format!("{} took {}", name, prettyprint_time(elapsed));

        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(StackEntry::TimerSpan(ref mut s)) => {
                s.nested_results.push(format!("{}- {}", padding, line));
                s.nested_results.extend(span.nested_results);
                if span.nested_time != 0.0 {
                    s.nested_results.push(format!(
                        "  {}- ... plus {}",
                        padding,
                        prettyprint_time(elapsed - span.nested_time)
                    ));
                }
                s.nested_time += elapsed;
            }
            Some(StackEntry::Progress(_)) => unreachable!(),
            None => {
                self.results.push(format!("{}- {}", padding, line));
                self.results.extend(span.nested_results);
                if span.nested_time != 0.0 {
                    self.results.push(format!(
                        "  - ... plus {}",
                        prettyprint_time(elapsed - span.nested_time)
                    ));
                }
            }
        }

        info!("{}", line);
        send(&mut self.sink, &name, 1.0, None);
    }

    pub fn start_iter(&mut self, name: &str, total_items: usize) {
        if total_items == 0 {
            return;
        }
        if let Some(StackEntry::Progress(p)) = self.stack.last() {
            panic!(
                "Can't start_iter({}) while Progress({}) is top of the stack",
                name, p.label
            );
        }

        self.stack
            .push(StackEntry::Progress(Progress::new(name, total_items)));
    }

    pub fn next(&mut self) {
        let maybe_result =
            if let Some(StackEntry::Progress(ref mut progress)) = self.stack.last_mut() {
                progress.next(&mut self.sink)
            } else {
                panic!("Can't next() while a TimerSpan is top of the stack");
            };
        if let Some((elapsed, result)) = maybe_result {
            self.stack.pop();
            self.add_result(elapsed, result);
        }
    }

    fn add_result(&mut self, elapsed: f64, line: String) {
        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(StackEntry::TimerSpan(ref mut s)) => {
                s.nested_results.push(format!("{}- {}", padding, line));
                s.nested_time += elapsed;
            }
            Some(StackEntry::Progress(_)) => unreachable!(),
            None => {
                self.results.push(format!("{}- {}", padding, line));
            }
        }
    }

    fn current_stage(&self) -> String {
        match self.stack.last() {
            Some(StackEntry::TimerSpan(s)) => s.name.clone(),
            Some(StackEntry::Progress(p)) => p.label.clone(),
            None => self.outermost_name.clone(),
        }
    }

    fn current_fraction(&self) -> f64 {
        match self.stack.last() {
            Some(StackEntry::Progress(p)) => (p.processed_items as f64) / (p.total_items as f64),
            _ => 0.0,
        }
    }

    /// Runs `cb` over every request on a bounded pool of threads. Results come back in the same
    /// order as the requests.
    pub fn parallelize<I, O, F>(
        &mut self,
        timer_name: &str,
        parallelism: Parallelism,
        requests: Vec<I>,
        cb: F,
    ) -> Vec<O>
    where
        I: Send,
        O: Send,
        F: Fn(I) -> O + Sync,
    {
        self.parallelize_until(timer_name, parallelism, &Cancellation::new(), requests, cb)
            .into_iter()
            .flatten()
            .collect()
    }

    /// Like `parallelize`, but each request first checks `cancel`. Requests that haven't started
    /// when it fires come back as None; ones already running finish normally.
    pub fn parallelize_until<I, O, F>(
        &mut self,
        timer_name: &str,
        parallelism: Parallelism,
        cancel: &Cancellation,
        requests: Vec<I>,
        cb: F,
    ) -> Vec<Option<O>>
    where
        I: Send,
        O: Send,
        F: Fn(I) -> O + Sync,
    {
        if requests.is_empty() {
            return Vec::new();
        }
        let num_workers = parallelism.num_workers().min(requests.len()).max(1);
        let cb = &cb;
        scoped_threadpool::Pool::new(num_workers as u32).scoped(|scope| {
            let (tx, rx) = std::sync::mpsc::channel();
            let mut results: Vec<Option<O>> = std::iter::repeat_with(|| None)
                .take(requests.len())
                .collect();
            for (idx, req) in requests.into_iter().enumerate() {
                let tx = tx.clone();
                scope.execute(move || {
                    let result = if cancel.is_cancelled() {
                        None
                    } else {
                        Some(cb(req))
                    };
                    // The receiver outlives every job
                    let _ = tx.send((idx, result));
                });
            }
            drop(tx);

            self.start_iter(timer_name, results.len());
            for (idx, result) in rx.iter() {
                self.next();
                results[idx] = result;
            }
            results
        })
    }
}

impl<'a> std::ops::Drop for Timer<'a> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let stop_name = self.outermost_name.clone();

        match self.stack.last() {
            Some(StackEntry::TimerSpan(ref s)) => {
                if s.name != stop_name {
                    error!("dropping Timer {} with {} still open", stop_name, s.name);
                    return;
                }
            }
            Some(StackEntry::Progress(ref p)) => {
                error!("dropping Timer {} in the middle of {}", stop_name, p.label);
                return;
            }
            None => unreachable!(),
        }

        self.stop(stop_name);
        for line in &self.results {
            info!("{}", line);
        }

        if !self.warnings.is_empty() {
            info!("{} warnings:", self.warnings.len());
            for line in &self.warnings {
                info!("{}", line);
            }
        }
    }
}
