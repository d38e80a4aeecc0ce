use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{LiveRoom, LiveRoomLog, LiveRoomMemberState, LiveRoomPoll};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Live rooms: channel name is the race-free lookup path for lazy creation
    create_indexes(
        db,
        LiveRoom::COLLECTION,
        vec![index_unique(bson::doc! { "channel_name": 1 })],
    )
    .await?;

    // Member states
    create_indexes(
        db,
        LiveRoomMemberState::COLLECTION,
        vec![
            index_unique(bson::doc! { "channel_id": 1, "user_id": 1, "state_type": 1 }),
            index(bson::doc! { "channel_id": 1, "state_type": 1 }),
        ],
    )
    .await?;

    // Poll history
    create_indexes(
        db,
        LiveRoomPoll::COLLECTION,
        vec![index(bson::doc! { "channel_id": 1, "ended_at": -1 })],
    )
    .await?;

    // Activity logs
    create_indexes(db, LiveRoomLog::COLLECTION, live_room_log_indexes()).await?;

    info!("All indexes ensured");
    Ok(())
}

/// At most one open log per channel, so racing counter upserts cannot
/// start a second one.
fn live_room_log_indexes() -> Vec<IndexModel> {
    vec![
        index(bson::doc! { "channel_id": 1, "created_at": -1 }),
        IndexModel::builder()
            .keys(bson::doc! { "channel_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(bson::doc! { "is_completed": false })
                    .build(),
            )
            .build(),
    ]
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
