#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use protosat::{ProcessStatus, SatFormat, SolverConfig, SolverRunner};

// Stands in for `/usr/bin/time -p -o FILE cmd...` with fixed numbers.
const FAKE_TIME: &str = "#!/bin/sh
shift
shift
out=\"$1\"
shift
\"$@\"
status=$?
printf 'real 0.50\\nuser 0.25\\nsys 0.01\\n' > \"$out\"
exit $status
";

// Kept as a single test so no other test forks while the wrapper script is
// still open for writing.
#[test]
fn timing_wrapper_reports_and_cleans_up() {
    let dir = temp_dir("timing");
    fs::create_dir_all(&dir).expect("mkdir");
    let time_bin = dir.join("fake_time");
    fs::write(&time_bin, FAKE_TIME).expect("write wrapper");
    fs::set_permissions(&time_bin, fs::Permissions::from_mode(0o755)).expect("chmod");

    let answer = write(&dir, "answer.sh", "echo 's OPTIMUM FOUND'\necho 'v 01'\n");
    let config = SolverConfig::new("/bin/sh")
        .with_working_dir(&dir)
        .with_time_bin(&time_bin)
        .with_time_output("times.out");
    let result = SolverRunner::new(config.clone()).solve(&answer, SatFormat::Cnf);
    assert_eq!(result.status, ProcessStatus::Success);
    assert_eq!(result.times.real_ms, Some(500));
    assert_eq!(result.times.user_ms, Some(250));
    assert_eq!(result.times.sys_ms, Some(10));
    assert_eq!(
        result.solution.expect("solution").assignments,
        vec![false, true]
    );
    assert!(!dir.join("times.out").exists());

    // the wrapper forks the solver, so the solver is a grandchild here
    let pid_file = dir.join("solver.pid");
    let hang = write(
        &dir,
        "hang.sh",
        &format!("echo $$ > '{}'\nexec sleep 30\n", pid_file.display()),
    );
    let result = SolverRunner::new(config.clone().with_timeout(Some(Duration::from_secs(1))))
        .solve(&hang, SatFormat::Cnf);
    assert_eq!(result.status, ProcessStatus::TimedOut);
    assert!(!dir.join("times.out").exists());
    let pid = fs::read_to_string(&pid_file)
        .expect("solver pid")
        .trim()
        .parse::<u32>()
        .expect("pid");
    assert!(wait_gone(pid), "solver {pid} outlived the deadline");

    fs::write(dir.join("times.out"), "keep me").expect("write");
    let result = SolverRunner::new(config).solve(&answer, SatFormat::Cnf);
    assert_eq!(result.status, ProcessStatus::Failed);
    assert_eq!(
        fs::read_to_string(dir.join("times.out")).expect("read"),
        "keep me"
    );

    let missing = SolverConfig::new("/no/such/solver")
        .with_working_dir(&dir)
        .with_time_bin(&time_bin);
    let result = SolverRunner::new(missing).solve(&answer, SatFormat::Cnf);
    assert_eq!(result.status, ProcessStatus::Failed);
}

// Gone, or a zombie waiting for init to reap it.
fn wait_gone(pid: u32) -> bool {
    let status = PathBuf::from(format!("/proc/{pid}/status"));
    if !Path::new("/proc/self").exists() {
        return true;
    }
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        let alive = match fs::read_to_string(&status) {
            Ok(text) => text
                .lines()
                .find(|l| l.starts_with("State:"))
                .is_some_and(|l| !l.contains('Z') && !l.contains('X')),
            Err(_) => false,
        };
        if !alive {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("write script");
    path
}

fn temp_dir(tag: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    p.push(format!("protosat_{}_{}", tag, t));
    p
}
