//! Shared fixtures for unit tests
//!
//! The sample bundle models a small AKS cluster running one Viya
//! namespace: two described nodes plus one node only present in the
//! manifest, two pods, two PVCs bound to cluster-wide PVs, and a mixed
//! JSON/plain-text container log.

use crate::archive::MemoryBundle;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::PathBuf;
use tempfile::TempDir;

pub const ENV_LOG: &str = "\
get-k8s-info 1.4.2
Namespace: viya
Version: Stable 2024.09
Order: 09ZX8K
Site Number: 70012345
License Expires: 15DEC2025
CAS Mode: SMP
TLS Mode: full-stack
Ingress Host: viya.example.com
USER_NS: ignored-because-namespace-is-set
";

pub const NODES_GET: &str = "\
NAME                STATUS   ROLES           AGE    VERSION
aks-cas-000000      Ready    agent           120d   v1.29.7
aks-system-000001   Ready    control-plane   120d   v1.29.7
";

pub const NODES_DESCRIBE: &str = "\
Name:               aks-cas-000000
Roles:              agent
Labels:             kubernetes.io/os=linux
                    workload.sas.com/class=cas
Capacity:
  cpu:                8
  memory:             32939140Ki
Non-terminated Pods:          (12 in total)
  Namespace                   Name                      CPU Requests  CPU Limits  Memory Requests  Memory Limits  Age
  ---------                   ----                      ------------  ----------  ---------------  -------------  ---
  viya                        sas-cas-server-default    1550m (19%)   3 (37%)     4Gi (13%)        8Gi (26%)      5d
Allocated resources:
  (Total limits may be over 100 percent, i.e., overcommitted.)
  Resource           Requests      Limits
  --------           --------      ------
  cpu                1550m (19%)   3 (37%)
  memory             4Gi (13%)     8Gi (26%)
Events:              <none>

Name:               aks-system-000001
Roles:              control-plane
Labels:             kubernetes.io/os=linux
Capacity:
  cpu:                4
  memory:             16393264Ki
Non-terminated Pods:          (7 in total)
Allocated resources:
  Resource           Requests      Limits
  --------           --------      ------
  cpu                850m (21%)    2 (50%)
  memory             1200Mi (7%)   3Gi (19%)
Events:              <none>
";

pub const NODES_JSON: &str = r#"{
  "apiVersion": "v1",
  "kind": "List",
  "items": [
    {
      "metadata": {
        "name": "aks-cas-000000",
        "annotations": {"node.alpha.kubernetes.io/ttl": "0"},
        "labels": {"kubernetes.io/os": "linux", "workload.sas.com/class": "cas"}
      },
      "spec": {
        "taints": [{"key": "workload.sas.com/class", "value": "cas", "effect": "NoSchedule"}]
      },
      "status": {
        "addresses": [{"type": "InternalIP", "address": "10.224.0.4"}],
        "allocatable": {"cpu": "7820m", "memory": "32901508Ki", "pods": "110"},
        "capacity": {"cpu": "8", "memory": "32939140Ki", "pods": "110"},
        "nodeInfo": {"osImage": "Ubuntu 22.04.4 LTS"}
      }
    },
    {
      "metadata": {
        "name": "aks-system-000001",
        "labels": {"kubernetes.io/os": "linux"}
      },
      "spec": {},
      "status": {
        "addresses": [{"type": "InternalIP", "address": "10.224.0.5"}],
        "allocatable": {"cpu": "3860m", "memory": "12879792Ki", "pods": "110"},
        "capacity": {"cpu": "4", "memory": "16393264Ki", "pods": "110"},
        "nodeInfo": {"osImage": "VMware Photon OS/Linux"}
      }
    },
    {
      "metadata": {"name": "aks-spare-000002"},
      "status": {
        "allocatable": {"memory": "unknown"},
        "nodeInfo": {"osImage": "Flatcar Container Linux"}
      }
    }
  ]
}"#;

pub const NODES_YAML: &str = "\
apiVersion: v1
kind: List
items:
- metadata:
    name: aks-yaml-000000
    labels:
      workload.sas.com/class: compute
  status:
    addresses:
    - type: InternalIP
      address: 10.224.0.9
    allocatable:
      cpu: 3860m
      memory: 2097152Ki
    capacity:
      cpu: \"4\"
      memory: 4194304Ki
    nodeInfo:
      osImage: Red Hat Enterprise Linux 8.9
";

pub const PODS_GET: &str = "\
NAME                            READY   STATUS    RESTARTS     AGE
sas-logon-app-7d9f8c6b5-abcde   1/1     Running   0            5d
sas-consul-server-0             1/1     Running   2 (3d ago)   5d
";

pub const PODS_DESCRIBE: &str = "\
Name:             sas-logon-app-7d9f8c6b5-abcde
Namespace:        viya
Status:           Running
Containers:
  sas-logon-app:
    Image:          cr.sas.com/viya-4-x64_oci_linux_2-docker/sas-logon-app:3.41.0
    State:          Running
Events:           <none>

Name:             sas-consul-server-0
Namespace:        viya
Status:           Running
Containers:
  sas-consul-server:
    State:          Running
    Restart Count:  2
Events:           <none>
";

pub const PODS_JSON: &str = r#"{
  "items": [
    {
      "metadata": {
        "name": "sas-logon-app-7d9f8c6b5-abcde",
        "labels": {"app": "sas-logon-app", "workload.sas.com/class": "stateless"}
      },
      "spec": {
        "initContainers": [{"name": "sas-certframe"}],
        "containers": [{"name": "sas-logon-app"}]
      },
      "status": {
        "initContainerStatuses": [{"name": "sas-certframe", "ready": true, "restartCount": 0}],
        "containerStatuses": [{"name": "sas-logon-app", "ready": true, "restartCount": 0}]
      }
    },
    {
      "metadata": {
        "name": "sas-consul-server-0",
        "labels": {"app": "sas-consul-server"}
      },
      "spec": {"containers": [{"name": "sas-consul-server"}]},
      "status": {
        "containerStatuses": [{"name": "sas-consul-server", "ready": true, "restartCount": 2}]
      }
    }
  ]
}"#;

pub const PVC_GET: &str = "\
NAME               STATUS   VOLUME     CAPACITY   ACCESS MODES   STORAGECLASS   AGE
cas-default-data   Bound    pvc-1111   8Gi        RWO            default        5d
sas-cachelocator   Bound    pvc-2222   1Gi        RWO            default        5d
";

pub const PVC_DESCRIBE: &str = "\
Name:          cas-default-data
Namespace:     viya
Status:        Bound
Volume:        pvc-1111
Events:        <none>

Name:          sas-cachelocator
Namespace:     viya
Status:        Bound
Volume:        pvc-2222
Events:        <none>
";

pub const PV_GET: &str = "\
NAME       CAPACITY   ACCESS MODES   RECLAIM POLICY   STATUS   CLAIM                   STORAGECLASS   AGE
pvc-1111   8Gi        RWO            Delete           Bound    viya/cas-default-data   default        5d
pvc-2222   1Gi        RWO            Delete           Bound    viya/sas-cachelocator   default        5d
";

pub const PV_DESCRIBE: &str = "\
Name:            pvc-1111
Labels:          <none>
StorageClass:    default
Status:          Bound
Claim:           viya/cas-default-data
Source:
    Type:              AzureDisk (an Azure Data Disk mount on the host and bind mount to the pod)
    DiskName:          pvc-1111
Events:          <none>

Name:            pvc-2222
Labels:          <none>
StorageClass:    default
Status:          Bound
Claim:           viya/sas-cachelocator
Events:          <none>
";

pub const CONFIGMAPS_GET: &str = "\
NAME                         DATA   AGE
sas-logon-app-parameters     3      5d
sas-shared-config            12     5d
";

pub const CONFIGMAPS_DESCRIBE: &str = "\
Name:         sas-logon-app-parameters
Namespace:    viya
Data
====
SAS_LOG_LEVEL:
----
INFO

Name:         sas-shared-config
Namespace:    viya
Data
====
SAS_URL_SERVICE_TEMPLATE:
----
https://viya.example.com
";

pub const LOGON_LOG: &str = r#"{"level":"debug","timeStamp":"2024-05-01T10:00:00.000Z","message":"Loading configuration","source":"sas-logon-app","version":1}
Starting sas-logon-app on port 8080
{"level":"warn","timeStamp":"2024-05-01T10:00:05.250Z","message":"Slow response from consul","messageKey":"consul.slow","source":"sas-logon-app","version":1}
{"level":"error","timeStamp":"2024-05-01T10:00:09+02:00","message":"Authentication failed","properties":{"user":"sasdemo"},"source":"sas-logon-app","version":1}
"#;

/// Member paths and contents of the sample bundle
pub fn sample_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("./.get-k8s-info/get-k8s-info.log", ENV_LOG),
        ("./kubernetes/clusterwide/get/nodes.txt", NODES_GET),
        ("./kubernetes/clusterwide/describe/nodes.txt", NODES_DESCRIBE),
        ("./kubernetes/clusterwide/json/nodes.json", NODES_JSON),
        ("./kubernetes/clusterwide/get/persistentvolumes.txt", PV_GET),
        ("./kubernetes/clusterwide/describe/persistentvolumes.txt", PV_DESCRIBE),
        ("./kubernetes/viya/get/pods.txt", PODS_GET),
        ("./kubernetes/viya/describe/pods.txt", PODS_DESCRIBE),
        ("./kubernetes/viya/json/pods.json", PODS_JSON),
        ("./kubernetes/viya/get/persistentvolumeclaims.txt", PVC_GET),
        ("./kubernetes/viya/describe/persistentvolumeclaims.txt", PVC_DESCRIBE),
        ("./kubernetes/viya/get/configmaps.txt", CONFIGMAPS_GET),
        ("./kubernetes/viya/describe/configmaps.txt", CONFIGMAPS_DESCRIBE),
        (
            "./kubernetes/viya/logs/sas-logon-app-7d9f8c6b5-abcde_sas-logon-app.log",
            LOGON_LOG,
        ),
    ]
}

/// The sample bundle as an in-memory source
pub fn sample_bundle() -> MemoryBundle {
    sample_files()
        .into_iter()
        .fold(MemoryBundle::new(), |bundle, (path, content)| {
            bundle.with_file(path, content)
        })
}

/// Helper to write a gzip-compressed tarball with the given members
///
/// Names are written into the header verbatim so `./`-prefixed members
/// survive; `tar::Builder` would otherwise normalize them away.
pub fn write_tarball(dir: &TempDir, file_name: &str, entries: &[(&str, &str)]) -> PathBuf {
    let raw: Vec<(&[u8], &[u8])> = entries
        .iter()
        .map(|(name, content)| (name.as_bytes(), content.as_bytes()))
        .collect();
    write_raw_tarball(dir, file_name, &raw)
}

/// Like [`write_tarball`], with member names given as raw bytes
pub fn write_raw_tarball(dir: &TempDir, file_name: &str, entries: &[(&[u8], &[u8])]) -> PathBuf {
    let path = dir.path().join(file_name);
    let file = std::fs::File::create(&path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder.append(&header, *content).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap();
    path
}

/// The sample bundle written to disk
pub fn sample_tarball(dir: &TempDir) -> PathBuf {
    write_tarball(dir, "sample-bundle.tgz", &sample_files())
}
