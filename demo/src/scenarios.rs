//! End-to-end scenarios run by the demo CLI.
//!
//! Each scenario opens its own connection to the shared in-memory database,
//! runs through the adapter, and closes the connection explicitly.

use tracing::info;

use rulestore_adapter::PolicyStoreAdapter;
use rulestore_conf::{load_model, save_model};
use rulestore_contracts::{config::StoreConfig, error::RuleStoreResult, model::PolicyModel};
use rulestore_core::traits::Adapter;
use rulestore_memdb::{MemoryClient, MemoryDatabase};

const RBAC_MODEL: &str = "[request_definition]
r = sub, obj, act

[policy_definition]
p = sub, obj, act

[role_definition]
g = _, _

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = g(r.sub, p.sub) && r.obj == p.obj && r.act == p.act
";

const RBAC_POLICY: [&[&str]; 5] = [
    &["p", "alice", "data1", "read"],
    &["p", "bob", "data2", "write"],
    &["p", "data2_admin", "data2", "read"],
    &["p", "data2_admin", "data2", "write"],
    &["g", "alice", "data2_admin"],
];

fn rule(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn open(db: &MemoryDatabase, config: &StoreConfig) -> PolicyStoreAdapter<MemoryClient> {
    PolicyStoreAdapter::with_config(db.connect(), config)
}

fn seed_model() -> PolicyModel {
    let mut model = PolicyModel::new();
    for line in RBAC_POLICY {
        let (ptype, fields) = line.split_at(1);
        model.add_policy(ptype[0], ptype[0], rule(fields));
    }
    model
}

fn print_stored(adapter: &PolicyStoreAdapter<MemoryClient>, label: &str) -> RuleStoreResult<()> {
    let mut model = PolicyModel::new();
    adapter.load_policy(&mut model)?;

    println!("  {label}:");
    for sec in ["p", "g"] {
        for (ptype, assertion) in model.section(sec) {
            let mut policy = assertion.policy.clone();
            policy.sort();
            for fields in policy {
                println!("    {ptype}, {}", fields.join(", "));
            }
        }
    }
    if model.is_empty() {
        println!("    (empty)");
    }
    Ok(())
}

/// Save the RBAC fixture, add and remove a rule, reload.
pub fn run_policy(db: &MemoryDatabase, config: &StoreConfig) -> RuleStoreResult<()> {
    println!("Scenario: save / add / remove in '{}'", config.collection_name());
    let adapter = open(db, config);

    adapter.save_policy(&seed_model())?;
    print_stored(&adapter, "after save_policy")?;

    adapter.add_policy("p", "p", &rule(&["alice", "data1", "write"]))?;
    print_stored(&adapter, "after add_policy(alice, data1, write)")?;

    adapter.remove_policy("p", "p", &rule(&["alice", "data1", "write"]))?;
    print_stored(&adapter, "after remove_policy(alice, data1, write)")?;

    adapter.close()?;
    info!(open = db.open_connections(), "policy scenario finished");
    println!();
    Ok(())
}

/// Filtered removes on fields 0, 1 and 2, then a wildcard filter.
pub fn run_filtered(db: &MemoryDatabase, config: &StoreConfig) -> RuleStoreResult<()> {
    println!("Scenario: filtered removal in '{}'", config.collection_name());
    let adapter = open(db, config);
    adapter.save_policy(&seed_model())?;

    for (field_index, values) in [(0, vec!["data2_admin"]), (1, vec!["data1"]), (2, vec!["write"])] {
        adapter.remove_filtered_policy("p", "p", field_index, &rule(&values))?;
        print_stored(
            &adapter,
            &format!("after remove_filtered_policy({field_index}, {values:?})"),
        )?;
    }

    adapter.add_policies(
        "p",
        "p",
        &[
            rule(&["domain1", "alice", "data3", "read", "accept", "service1"]),
            rule(&["domain1", "alice", "data3", "write", "accept", "service2"]),
        ],
    )?;
    adapter.remove_filtered_policy("p", "p", 0, &rule(&["domain1", "", "", "read"]))?;
    print_stored(&adapter, "after remove_filtered_policy(0, domain1, _, _, read)")?;

    adapter.clear_policy()?;
    print_stored(&adapter, "after clear_policy")?;

    adapter.close()?;
    println!();
    Ok(())
}

/// Store the model definition, reject an invalid one, load it back.
pub fn run_model(db: &MemoryDatabase, config: &StoreConfig) -> RuleStoreResult<()> {
    println!("Scenario: model definition in '{}'", config.collection_name());
    let client = db.connect();

    save_model(&client, RBAC_MODEL, config)?;
    println!("  saved RBAC model definition");

    let csv: String = RBAC_POLICY
        .iter()
        .map(|line| line.join(", "))
        .collect::<Vec<_>>()
        .join("\n");
    match save_model(&client, &csv, config) {
        Err(e) => println!("  rejected policy CSV as a model: {e}"),
        Ok(_) => println!("  unexpectedly accepted policy CSV as a model"),
    }

    let definition = load_model(&client, config)?;
    println!("  loaded definition:");
    for line in definition.text().lines() {
        println!("    {line}");
    }

    let adapter = PolicyStoreAdapter::with_config(client, config);
    adapter.save_policy(&seed_model())?;
    let mut model = definition.policy_model();
    adapter.load_policy(&mut model)?;
    println!("  policy loaded into declared model: {} rules", model.len());

    adapter.close()?;
    println!();
    Ok(())
}
