//! Port-level marketplace fixtures shared by the storage-backed suites.
//!
//! Everything goes through the driving ports on [`HttpState`], so the same
//! scenarios run over the in-memory store and over PostgreSQL.

use barter::domain::ports::ProposeSwapRequest;
use barter::domain::{
    Category, DisplayName, EmailAddress, ErrorCode, Item, ItemDescription, ItemName, Location,
    NewItem, NewPassword, RegistrationDraft, Swap, SwapDecision, SwapStatus, User,
};
use barter::inbound::http::state::HttpState;

/// Register a member through the account port.
pub async fn member(state: &HttpState, name: &str, email: &str) -> User {
    let draft = RegistrationDraft {
        display_name: DisplayName::new(name).expect("display name"),
        email: EmailAddress::new(email).expect("email"),
        password: NewPassword::new("secret-password").expect("password"),
        location: Location::new("Leeds").expect("location"),
    };
    state.accounts.register(draft).await.expect("register member")
}

/// List an item owned by `owner` through the item port.
pub async fn listing(state: &HttpState, owner: &User, name: &str) -> Item {
    let new_item = NewItem {
        name: ItemName::new(name).expect("item name"),
        description: ItemDescription::new(format!("A well loved {name}")).expect("description"),
        category: Category::new("misc").expect("category"),
        location: None,
    };
    state
        .items
        .create_item(owner.id(), new_item)
        .await
        .expect("create item")
}

/// Propose trading `offered` for `wanted` as `proposer`.
pub async fn propose(
    state: &HttpState,
    proposer: &User,
    wanted: &Item,
    offered: &Item,
) -> Result<Swap, barter::domain::Error> {
    state
        .swaps
        .propose(ProposeSwapRequest {
            proposer: *proposer.id(),
            item1: *wanted.id(),
            item2: *offered.id(),
        })
        .await
}

/// Three members and four listings: Alice owns `x`, Bob owns `y` and `z`,
/// Carol owns `w`.
pub struct Market {
    pub alice: User,
    pub bob: User,
    pub carol: User,
    pub x: Item,
    pub y: Item,
    pub z: Item,
    pub w: Item,
}

impl Market {
    pub async fn seed(state: &HttpState) -> Self {
        let alice = member(state, "Alice", "alice@example.com").await;
        let bob = member(state, "Bob", "bob@example.com").await;
        let carol = member(state, "Carol", "carol@example.com").await;
        let x = listing(state, &alice, "bicycle").await;
        let y = listing(state, &bob, "kettle").await;
        let z = listing(state, &bob, "lamp").await;
        let w = listing(state, &carol, "guitar").await;
        Self {
            alice,
            bob,
            carol,
            x,
            y,
            z,
            w,
        }
    }
}

/// Walk one proposal through conflict detection, approval and the
/// resulting ownership exchange.
pub async fn approval_exchanges_items(state: &HttpState) {
    let market = Market::seed(state).await;

    // Alice wants Bob's kettle and offers her bicycle.
    let swap = propose(state, &market.alice, &market.y, &market.x)
        .await
        .expect("first proposal");
    assert_eq!(swap.status(), SwapStatus::Pending);
    assert_eq!(swap.item1_user(), market.bob.id());
    assert_eq!(swap.item2_user(), market.alice.id());

    let clash = propose(state, &market.carol, &market.y, &market.w)
        .await
        .expect_err("kettle is already claimed");
    assert_eq!(clash.code(), ErrorCode::Conflict);

    let closed = state
        .swaps
        .resolve(market.bob.id(), swap.id(), SwapDecision::Approved)
        .await
        .expect("bob approves");
    assert_eq!(closed.status(), SwapStatus::Approved);
    assert_eq!(closed.item1_user(), market.alice.id());
    assert_eq!(closed.item2_user(), market.bob.id());

    let kettle = state.items_query.get_item(market.y.id()).await.expect("kettle");
    let bicycle = state.items_query.get_item(market.x.id()).await.expect("bicycle");
    assert!(kettle.is_owned_by(market.alice.id()));
    assert!(bicycle.is_owned_by(market.bob.id()));
    assert_eq!(
        kettle.owner_snapshot().map(|s| s.display_name.as_ref().to_owned()),
        Some("Alice".to_owned())
    );

    // Both items are free again once the swap is closed.
    propose(state, &market.carol, &market.y, &market.w)
        .await
        .expect("kettle can be offered for again");

    let again = state
        .swaps
        .resolve(market.alice.id(), swap.id(), SwapDecision::Rejected)
        .await
        .expect_err("closed swaps stay closed");
    assert_eq!(again.code(), ErrorCode::InvalidState);
}

/// Withdrawal deletes the swap and releases both items.
pub async fn withdrawal_releases_items(state: &HttpState) {
    let market = Market::seed(state).await;

    let swap = propose(state, &market.alice, &market.z, &market.x)
        .await
        .expect("proposal");
    let denied = state
        .swaps
        .withdraw(market.bob.id(), swap.id())
        .await
        .expect_err("only the proposer withdraws");
    assert_eq!(denied.code(), ErrorCode::Forbidden);

    state
        .swaps
        .withdraw(market.alice.id(), swap.id())
        .await
        .expect("alice withdraws");
    assert!(
        state
            .swaps_query
            .list_for_user(market.alice.id())
            .await
            .expect("alice's swaps")
            .is_empty()
    );

    propose(state, &market.carol, &market.z, &market.w)
        .await
        .expect("lamp is free again");
    state
        .items
        .delete_item(market.alice.id(), market.x.id())
        .await
        .expect("bicycle is no longer tied up");
}

/// A member's swap list is newest first whatever each swap's status.
pub async fn swaps_list_newest_first(state: &HttpState) {
    let market = Market::seed(state).await;

    let rejected = propose(state, &market.alice, &market.y, &market.x)
        .await
        .expect("alice wants the kettle");
    state
        .swaps
        .resolve(market.bob.id(), rejected.id(), SwapDecision::Rejected)
        .await
        .expect("bob rejects");
    let middle = propose(state, &market.carol, &market.y, &market.w)
        .await
        .expect("carol wants the kettle");
    let newest = propose(state, &market.alice, &market.z, &market.x)
        .await
        .expect("alice wants the lamp");

    let ids = |swaps: Vec<Swap>| swaps.iter().map(|swap| *swap.id()).collect::<Vec<_>>();
    let bobs = state
        .swaps_query
        .list_for_user(market.bob.id())
        .await
        .expect("bob's swaps");
    assert_eq!(
        bobs.iter().map(Swap::status).collect::<Vec<_>>(),
        [SwapStatus::Pending, SwapStatus::Pending, SwapStatus::Rejected]
    );
    assert_eq!(ids(bobs), [*newest.id(), *middle.id(), *rejected.id()]);

    let alices = state
        .swaps_query
        .list_for_user(market.alice.id())
        .await
        .expect("alice's swaps");
    assert_eq!(ids(alices), [*newest.id(), *rejected.id()]);
}
