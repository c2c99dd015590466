//! Integration tests for the bundle adapter over a scratch bundle on disk.

use camino::{Utf8Path, Utf8PathBuf};
use sosguard_bundle::{bundle_properties, BundleState, UNITS_LISTING, UNIT_FILES_LISTING};
use sosguard_expr::{evaluate, Context, SystemState, Value};
use tempfile::TempDir;

struct Bundle {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Bundle {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8Path::from_path(dir.path()).expect("utf8").to_path_buf();
        Self { _dir: dir, root }
    }

    fn write(&self, rel: &str, text: &str) -> &Self {
        let path = self.root.join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, text).expect("write");
        self
    }

    fn open(&self) -> BundleState {
        BundleState::open(&self.root).expect("open bundle")
    }
}

fn compute_node() -> Bundle {
    let b = Bundle::new();
    b.write("hostname", "compute-0.localdomain\n")
        .write(
            "uname",
            "Linux compute-0 5.14.0-284.11.1.el9_2.x86_64 #1 SMP x86_64 GNU/Linux\n",
        )
        .write(
            "etc/nova/nova.conf",
            "[DEFAULT]\ndebug = True\n[libvirt]\nvirt_type = kvm\n",
        )
        .write(
            UNIT_FILES_LISTING,
            "UNIT FILE                 STATE\n\
             nova-compute.service      enabled\n\
             sshd.service              enabled\n\n\
             2 unit files listed.\n",
        )
        .write(
            UNITS_LISTING,
            "  UNIT                  LOAD   ACTIVE SUB     DESCRIPTION\n\
             \x20 sshd.service          loaded active running OpenSSH server daemon\n\n\
             1 loaded units listed.\n",
        );
    b
}

#[test]
fn files_resolve_under_the_root() {
    let b = compute_node();
    let state = b.open();

    let info = state.file("/etc/nova/nova.conf").expect("present");
    assert_eq!(info.path, "/etc/nova/nova.conf");
    assert_eq!(info.size, 49);
    assert!(info.mtime > 0);

    assert!(state.file("etc/nova/nova.conf").is_some());
    assert!(state.file("etc/missing.conf").is_none());
}

#[test]
fn escaping_paths_are_absent() {
    let b = compute_node();
    let state = b.open();
    assert!(state.file("../../etc/passwd").is_none());
    assert!(state.ini("etc/../../outside.conf").is_none());
    assert!(state.certificate("../x.pem").is_err());
}

#[cfg(unix)]
#[test]
fn absolute_symlinks_stay_inside_the_bundle() {
    use std::os::unix::fs::symlink;

    let b = compute_node();
    b.write("sos_commands/host/hostname", "linked-host\n");
    std::fs::remove_file(b.root.join("hostname")).expect("rm");
    symlink("sos_commands/host/hostname", b.root.join("hostname")).expect("link");
    // Points at the captured host's /etc/passwd, which the bundle lacks.
    symlink("/etc/passwd", b.root.join("etc/passwd-link")).expect("link");
    symlink("/etc/nova/nova.conf", b.root.join("etc/nova/current.conf")).expect("link");

    let state = b.open();
    assert!(state.file("/etc/passwd-link").is_none());
    assert!(state.ini("/etc/passwd-link").is_none());
    assert_eq!(state.file("/etc/nova/current.conf").map(|f| f.size), Some(49));

    let properties = bundle_properties(&state);
    let ctx = Context::new(&state, &properties);
    assert_eq!(
        evaluate("read_ini('/etc/nova/current.conf', 'virt_type', 'libvirt')", &ctx).unwrap(),
        Value::from("kvm")
    );
    assert_eq!(
        evaluate("file('/etc/passwd-link')", &ctx).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(
        evaluate("@sos.hostname", &ctx).unwrap(),
        Value::from("linked-host")
    );
}

#[test]
fn open_requires_a_directory() {
    let b = compute_node();
    assert!(BundleState::open(&b.root.join("hostname")).is_err());
    assert!(BundleState::open(&b.root.join("nope")).is_err());
}

#[test]
fn units_come_from_both_listings() {
    let state = compute_node().open();
    let sshd = state.systemd_unit("sshd.service").expect("sshd");
    assert_eq!(sshd.state.as_deref(), Some("enabled"));
    assert_eq!(sshd.active_state.as_deref(), Some("active"));

    let nova = state.systemd_unit("nova-compute.service").expect("nova");
    assert_eq!(nova.active_state, None);
    assert!(state.systemd_unit("httpd.service").is_none());
    assert_eq!(state.unit_names(), vec!["nova-compute.service", "sshd.service"]);
}

#[test]
fn expressions_against_a_bundle() {
    let b = compute_node();
    let state = b.open();
    let registry = bundle_properties(&state);
    let ctx = Context::new(&state, &registry);
    let eval = |src: &str| evaluate(src, &ctx).expect(src);

    assert_eq!(
        eval("read_ini('/etc/nova/nova.conf', 'debug') == 'True'"),
        Value::Bool(true)
    );
    assert_eq!(
        eval("read_ini('/etc/nova/nova.conf', 'virt_type', 'libvirt')"),
        Value::from("kvm")
    );
    assert_eq!(
        eval("systemd('nova-compute.service', 'state') == 'enabled'"),
        Value::Bool(true)
    );
    assert_eq!(eval("systemd('nonexistent') > 1"), Value::Bool(false));
    assert_eq!(
        eval("file('etc/nova/nova.conf') and not file('etc/nova/missing.conf')"),
        Value::Bool(true)
    );
    assert_eq!(eval("@sos.hostname"), Value::from("compute-0.localdomain"));
    assert_eq!(
        eval("'el9' in @sos.kernel.release"),
        Value::Bool(true)
    );
    assert_eq!(
        eval("'sshd.service' in @sos.systemd.units"),
        Value::Bool(true)
    );
}

#[test]
fn kernel_release_prefers_proc() {
    let b = compute_node();
    b.write("proc/sys/kernel/osrelease", "6.1.0-test\n");
    let state = b.open();
    let registry = bundle_properties(&state);
    let ctx = Context::new(&state, &registry);
    assert_eq!(
        evaluate("@sos.kernel.release", &ctx).unwrap(),
        Value::from("6.1.0-test")
    );
}

#[test]
fn empty_bundle_yields_none_variables() {
    let b = Bundle::new();
    let state = b.open();
    let registry = bundle_properties(&state);
    let ctx = Context::new(&state, &registry);
    assert_eq!(evaluate("@sos.hostname == none", &ctx).unwrap(), Value::Bool(true));
    assert_eq!(evaluate("len(@sos.systemd.units)", &ctx).unwrap(), Value::Int(0));
    assert_eq!(
        evaluate("read_cert('etc/pki/tls/certs/localhost.crt')", &ctx).unwrap(),
        Value::Bool(false)
    );
}
