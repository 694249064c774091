//! Ready-made example requests, one or more per flow.

use crate::flows::FlowKind;

/// A sample prose request for a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamplePrompt {
    pub flow: FlowKind,
    pub title: &'static str,
    pub text: &'static str,
}

/// The built-in examples, in menu order.
pub const EXAMPLE_PROMPTS: &[ExamplePrompt] = &[
    ExamplePrompt {
        flow: FlowKind::Api,
        title: "Table API",
        text: "I want to build an API located in demo_org_001 under the app demo_app_001 for the \
               datasource demo_ds_001. The API name should be get_products_count. The API is of \
               type TABLE and uses the backend resource production.products.",
    },
    ExamplePrompt {
        flow: FlowKind::Api,
        title: "Custom SQL API",
        text: "I want to build an API located in demo_org_001 under the app demo_app_001 for the \
               datasource demo_ds_001. The API name should be get_products_count_custom. The API \
               is of type CUSTOMSQL and uses the SQL below:\n\
               SELECT category_id, count(1) num_products FROM production.products group by category_id",
    },
    ExamplePrompt {
        flow: FlowKind::Api,
        title: "API in one sentence",
        text: "I want to build an API called ai_driven_api_001 which connects to the backend \
               resource production.products in the datasource demo_ds_001 and store it under \
               application demo_app_001 in organization demo_org_001.",
    },
    ExamplePrompt {
        flow: FlowKind::DqRule,
        title: "Range check",
        text: "For my API `demo_org_001/demo_app_001/demo_ds_001/salesorderitems/0.0.0`, add a dq \
               rule for the field `list_price` to ensure it remains in range 300-500",
    },
    ExamplePrompt {
        flow: FlowKind::Profile,
        title: "Regional profile",
        text: "In my org demo_org_001, I want to create a profile with key region and value Asia. \
               Assign this profile to the following users: analyst@example.com, test_user@example.com",
    },
    ExamplePrompt {
        flow: FlowKind::Api,
        title: "SQL only",
        text: "select orders.*, stores.store_name, stores.state, stores.city\n\
               from [sales].[orders] inner join [sales].[stores] on (stores.store_id = orders.store_id)\n\
               where stores.state = 'NY'",
    },
];

/// Examples for one flow.
pub fn examples_for(flow: FlowKind) -> impl Iterator<Item = &'static ExamplePrompt> {
    EXAMPLE_PROMPTS.iter().filter(move |p| p.flow == flow)
}
