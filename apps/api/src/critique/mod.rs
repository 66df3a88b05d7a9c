// Resume critique: extract the uploaded document, build the review prompt,
// gate on the credential, then make a single completion call.
// All provider calls go through llm_client.

pub mod credentials;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
