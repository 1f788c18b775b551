use mlfq_scheduler::metrics::Summary;
use mlfq_scheduler::recorder::{LogEntry, RunLog, Timeline};
use mlfq_scheduler::{Pid, Schedule};

const TICK_MARK: usize = 5;

fn pid_list<'a>(pids: impl Iterator<Item = &'a Pid>) -> String {
    pids.map(Pid::as_str).collect::<Vec<_>>().join(", ")
}

/// Two lines per entry: what happened, then the queues right after it
pub fn format_entry(entry: &LogEntry) -> String {
    let mut line = format!("[T={:02}] {}", entry.time.get(), entry.action);

    if let Some(pid) = &entry.pid {
        line.push_str(&format!(" - P:{}", pid));
    }
    match (entry.from_level, entry.to_level) {
        (Some(from), Some(to)) => line.push_str(&format!(" ({} -> {})", from, to)),
        (None, Some(to)) => line.push_str(&format!(" (To {})", to)),
        (Some(from), None) => line.push_str(&format!(" (From {})", from)),
        (None, None) => {}
    }

    let queues = entry
        .queues
        .iter()
        .map(|snapshot| format!("{}:[{}]", snapshot.level, pid_list(snapshot.pids.iter())))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}\n      -> Queues: {} | IO:[{}]",
        line,
        queues,
        pid_list(entry.io_pool.iter())
    )
}

pub fn render_log(log: &RunLog) -> String {
    if log.is_empty() {
        return "(no queue events)\n".to_string();
    }

    let mut out = String::new();
    for entry in log.iter() {
        out.push_str(&format_entry(entry));
        out.push('\n');
    }
    out
}

/// One row per process, one column per tick, up to `horizon`
pub fn render_gantt(timeline: &Timeline, horizon: usize) -> String {
    let horizon = timeline
        .end()
        .map_or(0, |end| end.get().min(horizon));
    if horizon == 0 {
        return "(no CPU activity)\n".to_string();
    }

    let mut pids: Vec<&Pid> = timeline.iter().map(|segment| &segment.pid).collect();
    pids.sort();
    pids.dedup();
    let width = pids.iter().map(|pid| pid.as_str().len()).max().unwrap_or(0);

    let mut out = String::new();
    for pid in pids {
        let mut row = vec!['.'; horizon];
        for segment in timeline.for_pid(pid) {
            let end = segment.end.get().min(horizon);
            for tick in row.iter_mut().take(end).skip(segment.start.get()) {
                *tick = '#';
            }
        }
        out.push_str(&format!(
            "{:<width$} |{}|\n",
            pid.as_str(),
            row.into_iter().collect::<String>(),
            width = width
        ));
    }

    let mut axis: String = (0..horizon)
        .step_by(TICK_MARK)
        .map(|tick| format!("{:<width$}", tick, width = TICK_MARK))
        .collect();
    axis.truncate(horizon + 1);
    out.push_str(&format!("{:<width$}  {}\n", "", axis.trim_end(), width = width));
    out
}

pub fn render_metrics(summary: &Summary) -> String {
    let mut out = format!(
        "{:<8} {:>4} {:>7} {:>5} {:>3} {:>5} {:>6} {:>10} {:>7} {:>8}\n",
        "PID", "Prio", "Arrival", "Burst", "IO", "Start", "Finish", "Turnaround", "Waiting", "Response"
    );
    for m in summary.processes.iter() {
        out.push_str(&format!(
            "{:<8} {:>4} {:>7} {:>5} {:>3} {:>5} {:>6} {:>10} {:>7} {:>8}\n",
            m.pid.as_str(),
            m.priority,
            m.arrival_time.get(),
            m.burst_time,
            m.io_burst,
            m.start_time.get(),
            m.completion_time.get(),
            m.turnaround_time,
            m.waiting_time,
            m.response_time
        ));
    }

    match (
        summary.average_turnaround,
        summary.average_waiting,
        summary.average_response,
    ) {
        (Some(turnaround), Some(waiting), Some(response)) => out.push_str(&format!(
            "Average turnaround {:.2}, waiting {:.2}, response {:.2}\n",
            turnaround, waiting, response
        )),
        _ => out.push_str("No process completed\n"),
    }
    if !summary.unfinished.is_empty() {
        out.push_str(&format!(
            "Unfinished: {}\n",
            pid_list(summary.unfinished.iter())
        ));
    }
    out
}

pub fn render(algorithm: &str, schedule: &Schedule, summary: &Summary, horizon: usize) -> String {
    let mut out = format!("== {} ==\n\n", algorithm);

    out.push_str(&format!("Gantt chart (T=0..{})\n", horizon));
    out.push_str(&render_gantt(&schedule.timeline, horizon));

    out.push_str("\nQueue log\n");
    out.push_str(&render_log(&schedule.log));

    out.push_str("\nMetrics\n");
    out.push_str(&render_metrics(summary));

    if schedule.truncated {
        out.push_str(&format!(
            "\nStopped at T={} with work left\n",
            schedule.finished_at
        ));
    }
    out
}
