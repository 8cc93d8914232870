/*! Integration tests for houseview.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * - items / elements: store behaviour through an Instance
 * - backend: both storage backends, persistence across reopen
 * - auth: login and the two gates working together
 * - http: the router served over a real socket
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("houseview=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod elements;
mod http;
mod items;
