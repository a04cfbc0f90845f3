// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Patterns that refuse a command outright, before any `Command` is
//! built. Matched line-by-line (`multi_line(true)`) so a heredoc body
//! can't smuggle a blocked pattern past a single-line scan.

use regex::RegexSet;
use std::sync::LazyLock;

/// One blocklist pattern, with a human label for the refusal message.
struct Rule {
    label: &'static str,
    pattern: &'static str,
}

const RULES: &[Rule] = &[
    // Recursive delete of home/root
    Rule { label: "recursive delete of root", pattern: r"rm\s+-[a-zA-Z]*r[a-zA-Z]*f[a-zA-Z]*\s+/\s*($|[;&|])" },
    Rule { label: "recursive delete of root", pattern: r"rm\s+-[a-zA-Z]*f[a-zA-Z]*r[a-zA-Z]*\s+/\s*($|[;&|])" },
    Rule { label: "recursive delete of home", pattern: r"rm\s+-[a-zA-Z]*r[a-zA-Z]*\s+(-[a-zA-Z]+\s+)*(~|\$HOME)(/\*)?\s*($|[;&|])" },
    Rule { label: "recursive delete of home", pattern: r"rm\s+-[a-zA-Z]*r[a-zA-Z]*\s+/home(/[\w.-]+)?\s*($|[;&|])" },
    Rule { label: "recursive delete via wildcard root", pattern: r"rm\s+-[a-zA-Z]*r[a-zA-Z]*\s+/\*" },
    // Dotfile writes
    Rule { label: "dotfile overwrite", pattern: r">\s*(~|\$HOME)/\.[\w./-]+" },
    Rule { label: "bashrc/profile tamper", pattern: r"(~|\$HOME)/\.(bashrc|bash_profile|profile|zshrc)\b" },
    Rule { label: "ssh key directory write", pattern: r"(~|\$HOME)/\.ssh/" },
    // sudo / privilege escalation
    Rule { label: "sudo invocation", pattern: r"(^|[;&|]\s*)sudo\s" },
    Rule { label: "su invocation", pattern: r"(^|[;&|]\s*)su\s+-" },
    Rule { label: "doas invocation", pattern: r"(^|[;&|]\s*)doas\s" },
    // format / mkfs
    Rule { label: "filesystem format", pattern: r"\bmkfs(\.\w+)?\s+/dev/" },
    Rule { label: "raw disk write", pattern: r"\bdd\s+.*of=/dev/(sd|nvme|hd|disk)" },
    Rule { label: "partition table wipe", pattern: r"\b(fdisk|parted|sfdisk)\s+/dev/" },
    // pipe-to-shell
    Rule { label: "curl piped to shell", pattern: r"curl\s+[^|]*\|\s*(sudo\s+)?(ba)?sh\b" },
    Rule { label: "wget piped to shell", pattern: r"wget\s+[^|]*\|\s*(sudo\s+)?(ba)?sh\b" },
    Rule { label: "remote script piped to interpreter", pattern: r"\bcurl\s+[^|]*\|\s*python[23]?\b" },
    Rule { label: "cat piped to shell", pattern: r"\bcat\s+[^|]*\|\s*(sudo\s+)?(ba)?sh\b" },
    Rule { label: "base64 piped to shell", pattern: r"\bbase64\s+[^|]*\|\s*(sudo\s+)?(ba)?sh\b" },
    Rule { label: "printf piped to shell", pattern: r"\bprintf\s+[^|]*\|\s*(sudo\s+)?sh\b" },
    // chmod/chown world-writable on home/root
    Rule { label: "world-writable chmod", pattern: r"chmod\s+(-R\s+)?(777|a\+rwx|ugo\+rwx)\b" },
    Rule { label: "chmod on root", pattern: r"chmod\s+-R\s+\S+\s+/\s*($|[;&|])" },
    Rule { label: "chown on root", pattern: r"chown\s+-R\s+\S+\s+/\s*($|[;&|])" },
    // inline interpreter -c / -e
    Rule { label: "inline python exec", pattern: r"python[23]?\s+-c\s+.*\b(os\.system|subprocess|shutil\.rmtree)\b" },
    Rule { label: "inline perl exec", pattern: r"perl\s+-e\s+.*\bsystem\b" },
    Rule { label: "inline ruby exec", pattern: r"ruby\s+-e\s+.*`.*`" },
    Rule { label: "inline node eval", pattern: r"node\s+-e\s+.*\brequire\(.child_process.\)" },
    // destructive find
    Rule { label: "find -delete on root/home", pattern: r"find\s+(/|~|\$HOME)\s+.*-delete\b" },
    Rule { label: "find -exec rm on root/home", pattern: r"find\s+(/|~|\$HOME)\s+.*-exec\s+rm\b" },
    // home relocation / dotfile symlink attacks
    Rule { label: "HOME reassignment", pattern: r"(^|[;&|]\s*)export\s+HOME=" },
    Rule { label: "symlink over dotfile", pattern: r"ln\s+-s[fn]*\s+\S+\s+(~|\$HOME)/\." },
    // eval with command substitution
    Rule { label: "eval of command substitution", pattern: r"eval\s+.*\$\(.*\)" },
    Rule { label: "eval of backtick substitution", pattern: r"eval\s+.*`.*`" },
    // quoting-split -c abuse
    Rule { label: "split -c shell injection", pattern: r#"sh\s+-c\s+['"].*;.*rm\s+-rf"# },
    Rule { label: "bash -c with embedded rm -rf", pattern: r#"bash\s+-c\s+['"].*rm\s+-rf\s+/"# },
    // fork bombs and device wipes
    Rule { label: "fork bomb", pattern: r":\(\)\s*\{\s*:\|:&\s*\};:" },
    Rule { label: "write to block device", pattern: r">\s*/dev/(sd|nvme|hd)[a-z0-9]*\b" },
    // crontab / systemd persistence
    Rule { label: "crontab install", pattern: r"\bcrontab\s+-" },
    Rule { label: "systemd unit install", pattern: r"systemctl\s+(enable|start)\s+\S" },
    // network exfiltration via netcat listener
    Rule { label: "netcat reverse shell", pattern: r"\bnc\s+.*-e\s*/bin/(ba)?sh" },
    // iptables flush
    Rule { label: "iptables flush", pattern: r"iptables\s+-F\b" },
    // shutdown/reboot
    Rule { label: "system shutdown", pattern: r"(^|[;&|]\s*)(shutdown|reboot|halt|poweroff)\b" },
    // kernel module load
    Rule { label: "kernel module load", pattern: r"\b(insmod|modprobe)\s+\S" },
];

// Allow expect here as every pattern above is a compile-time constant
// verified valid by the test suite.
#[allow(clippy::expect_used)]
static RULE_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    let patterns: Vec<&str> = RULES.iter().map(|r| r.pattern).collect();
    RegexSet::new(&patterns).expect("tier1 patterns are valid regex")
});

fn compiled() -> &'static RegexSet {
    &RULE_SET
}

/// A tier-1 rule matched somewhere in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub label: &'static str,
    pub line: String,
}

/// Scan `text` line by line against the tier-1 blocklist. Returns every
/// match found (not just the first), so the refusal message can list
/// every offending line.
pub fn scan(text: &str) -> Vec<Violation> {
    let set = compiled();
    let mut violations = Vec::new();
    for line in text.lines() {
        for idx in set.matches(line).iter() {
            violations.push(Violation { label: RULES[idx].label, line: line.to_string() });
        }
    }
    violations
}

/// True as soon as any tier-1 pattern matches — the fast path callers
/// should use before building a refusal message.
pub fn is_blocked(text: &str) -> bool {
    text.lines().any(|line| compiled().is_match(line))
}

#[cfg(test)]
#[path = "tier1_tests.rs"]
mod tests;
