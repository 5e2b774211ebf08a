//! Prints the CRD manifests as a multi-document YAML stream.

use crds::{Host, Migration, Plan, Provider};
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    let crds = [Provider::crd(), Host::crd(), Plan::crd(), Migration::crd()];
    for crd in &crds {
        println!("---");
        print!("{}", serde_yaml::to_string(crd)?);
    }
    Ok(())
}
