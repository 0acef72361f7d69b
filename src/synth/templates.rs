//! Per-tool output templates
//!
//! Each template renders a plausible transcript for one tool. Parameters are
//! read through [`Params`] with the tool's own defaults; random figures come
//! from the caller's RNG and timestamps from the caller's clock so output
//! can be reproduced in tests.

use chrono::NaiveDateTime;
use rand::Rng;

use super::Params;

const RULE: &str = "---------------------------------------------------------------------------";

pub(super) fn nmap<R: Rng + ?Sized>(params: &Params<'_>, rng: &mut R) -> String {
    let target = params.text("target", "192.168.1.1");
    let duration: f64 = rng.random_range(2.5..5.0);
    format!(
        "Starting Nmap 7.94 ( https://nmap.org )
Nmap scan report for {target}
Host is up (0.00042s latency).
PORT     STATE SERVICE     VERSION
22/tcp   open  ssh         OpenSSH 8.9p1
80/tcp   open  http        Apache httpd 2.4.52
443/tcp  open  ssl/http    Apache httpd 2.4.52
3306/tcp open  mysql       MySQL 8.0.33

Nmap done: 1 IP address (1 host up) scanned in {duration:.2} seconds"
    )
}

pub(super) fn nikto<R: Rng + ?Sized>(
    params: &Params<'_>,
    rng: &mut R,
    now: NaiveDateTime,
) -> String {
    let ip = params.text("target", "192.168.1.1");
    let hostname = params.text("target", "target.local");
    let port = params.text("port", "80");
    let stamp = now.format("%Y-%m-%d %H:%M:%S");
    let items: u32 = rng.random_range(5..=15);
    format!(
        "- Nikto v2.5.0
{RULE}
+ Target IP:          {ip}
+ Target Hostname:    {hostname}
+ Target Port:        {port}
+ Start Time:         {stamp}
{RULE}
+ Server: Apache/2.4.52 (Ubuntu)
+ /: The anti-clickjacking X-Frame-Options header is not present.
+ /: The X-Content-Type-Options header is not set.
+ /admin/: Directory indexing found.
+ OSVDB-3092: /admin/: This might be interesting.
+ OSVDB-3268: /icons/: Directory indexing found.
+ {items} item(s) reported on remote host
+ End Time:           {stamp}
{RULE}"
    )
}

pub(super) fn sqlmap(params: &Params<'_>, now: NaiveDateTime) -> String {
    let target = params.text("target", "parameter");
    let stamp = now.format("%H:%M:%S");
    format!(
        "[*] starting @ {stamp}
[INFO] testing connection to the target URL
[INFO] checking if the target is protected by WAF/IPS
[INFO] testing if the target URL content is stable
[INFO] target URL content is stable
[INFO] testing 'AND boolean-based blind - WHERE or HAVING clause'
[INFO] {target} appears to be 'AND boolean-based blind' injectable
[INFO] testing 'MySQL >= 5.0.12 AND time-based blind'
[INFO] {target} appears to be 'MySQL >= 5.0.12 AND time-based blind' injectable
[INFO] the back-end DBMS is MySQL
web server operating system: Linux Ubuntu
web application technology: Apache 2.4.52, PHP 8.1.2
back-end DBMS: MySQL >= 5.0.12
[*] ending @ {stamp}"
    )
}

pub(super) fn hydra<R: Rng + ?Sized>(params: &Params<'_>, rng: &mut R) -> String {
    let wordlist_size = params.text("wordlist_size", "14344");
    let service = params.text("service", "ssh");
    let target = params.text("target", "192.168.1.1");
    let port = params.text("port", "22");
    let found_pass = params.text("found_pass", "admin123");
    let rate: u32 = rng.random_range(100..=500);
    let tries: u32 = rng.random_range(1000..=5000);
    let hours: u32 = rng.random_range(1..=5);
    format!(
        "Hydra v9.4 (c) 2022 by van Hauser/THC
[DATA] max 16 tasks per 1 server, overall 16 tasks, {wordlist_size} login tries
[DATA] attacking {service}://{target}:{port}/
[STATUS] {rate}.00 tries/min, {tries} tries in 00:0{hours}h
[{port}][{service}] host: {target} login: admin password: {found_pass}
1 of 1 target successfully completed, 1 valid password found"
    )
}

pub(super) fn dirb(params: &Params<'_>, now: NaiveDateTime) -> String {
    let target = params.text("target", "192.168.1.1");
    let stamp = now.format("%c");
    format!(
        "-----------------
DIRB v2.22
By The Dark Raver
-----------------
START_TIME: {stamp}
URL_BASE: http://{target}/
WORDLIST_FILES: /usr/share/dirb/wordlists/common.txt
-----------------
GENERATED WORDS: 4612

---- Scanning URL: http://{target}/ ----
+ http://{target}/admin (CODE:301|SIZE:315)
+ http://{target}/backup (CODE:403|SIZE:277)
+ http://{target}/config (CODE:403|SIZE:277)
+ http://{target}/images (CODE:301|SIZE:315)
+ http://{target}/index.php (CODE:200|SIZE:4521)
-----------------
END_TIME: {stamp}
DOWNLOADED: 4612 - FOUND: 5"
    )
}

pub(super) fn john<R: Rng + ?Sized>(rng: &mut R) -> String {
    let hashes: u32 = rng.random_range(1..=10);
    let salts: u32 = rng.random_range(1..=5);
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let cracked: u32 = rng.random_range(1..=3);
    let seconds: u32 = rng.random_range(10..=59);
    format!(
        "Using default input encoding: UTF-8
Loaded {hashes} password hashes with {salts} different salts
Will run {threads} OpenMP threads
Press 'q' or Ctrl-C to abort, almost any other key for status
admin123         (admin)
password         (user1)
{cracked}g 0:00:00:{seconds} DONE
Session completed"
    )
}

pub(super) fn netcat(params: &Params<'_>) -> String {
    let target = params.text("target", "192.168.1.1");
    let port = params.text("port", "80");
    format!(
        "Connection to {target} {port} port [tcp/*] succeeded!
HTTP/1.1 200 OK
Server: Apache/2.4.52
Content-Type: text/html"
    )
}

pub(super) fn whois(params: &Params<'_>) -> String {
    let target = params.text("target", "example.com");
    format!(
        "Domain Name: {target}
Registry Domain ID: 123456789_DOMAIN_COM-VRSN
Registrar: Example Registrar, Inc.
Creation Date: 2020-01-15T00:00:00Z
Registry Expiry Date: 2025-01-15T00:00:00Z
Registrar IANA ID: 12345
Name Server: NS1.EXAMPLE.COM
Name Server: NS2.EXAMPLE.COM
DNSSEC: unsigned"
    )
}

const HARVESTER_BANNER: &str = r"*******************************************************************
*  _   _                                            _             *
* | |_| |__   ___    /\  /\__ _ _ ____   _____  ___| |_ ___ _ __  *
* | __| '_ \ / _ \  / /_/ / _` | '__\ \ / / _ \/ __| __/ _ \ '__| *
* | |_| | | |  __/ / __  / (_| | |   \ V /  __/\__ \ ||  __/ |    *
*  \__|_| |_|\___| \/ /_/ \__,_|_|    \_/ \___||___/\__\___|_|    *
*                                                                 *
* theHarvester 4.4.0                                              *
*******************************************************************";

pub(super) fn the_harvester<R: Rng + ?Sized>(params: &Params<'_>, rng: &mut R) -> String {
    let target = params.text("target", "example.com");
    let emails: u32 = rng.random_range(3..=10);
    let hosts: u32 = rng.random_range(2..=5);
    format!(
        "{HARVESTER_BANNER}

[*] Target: {target}
[*] Searching: Google, Bing, LinkedIn

[*] Emails found: {emails}
------------------
admin@{target}
info@{target}
support@{target}

[*] Hosts found: {hosts}
------------------
mail.{target}
www.{target}
api.{target}"
    )
}

/// Fallback for every tool without a dedicated template
pub(super) fn generic(tool_name: &str, params: &Params<'_>) -> String {
    format!(
        "[*] Executing {tool_name}...
[*] Parameters: {}
[+] Tool execution completed successfully
[*] Analysis complete - check results above",
        params.pretty_json()
    )
}
