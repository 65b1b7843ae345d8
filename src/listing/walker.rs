//! Group Tree Traversal
//!
//! Enumerates the replays of a group and all of its descendants. The API only
//! lists direct children and direct replays, so the tree is discovered one
//! level at a time.

use crate::api::{Group, GroupFilter, Replay, ReplayFilter};
use crate::error::Result;
use crate::BallchasingClient;
use async_stream::try_stream;
use futures::{pin_mut, Stream, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A group reached by the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupVisit {
    pub id: String,

    /// Group ids from the root down to this group, the root included
    pub path: PathBuf,
}

/// Pending work on the explicit traversal stack
enum Frame {
    /// List the children of a group and schedule them before the group itself
    Expand(GroupVisit),

    /// Every descendant is done; hand out the group
    Visit(GroupVisit),
}

/// Post-order walk over a group tree
#[derive(Clone, Copy)]
pub struct GroupTreeWalker<'a> {
    client: &'a BallchasingClient,
}

impl<'a> GroupTreeWalker<'a> {
    pub fn new(client: &'a BallchasingClient) -> Self {
        Self { client }
    }

    /// Every group under `root`, descendants first.
    ///
    /// Child subtrees are walked in the order the server lists them, and a
    /// group follows all of its subtrees. A group reached twice is skipped.
    /// Any failure ends the walk.
    pub fn groups(&self, root: &str) -> impl Stream<Item = Result<GroupVisit>> + 'a {
        let client = self.client;
        let root = GroupVisit {
            id: root.to_string(),
            path: PathBuf::from(root),
        };

        try_stream! {
            let mut visited = HashSet::new();
            let mut stack = vec![Frame::Expand(root)];

            while let Some(frame) = stack.pop() {
                match frame {
                    Frame::Expand(group) => {
                        if !visited.insert(group.id.clone()) {
                            warn!(group = %group.id, "Group reached twice, skipping");
                            continue;
                        }

                        let children = child_groups(client, &group.id).await?;
                        let parent = group.path.clone();
                        stack.push(Frame::Visit(group));
                        for child in children.into_iter().rev() {
                            stack.push(Frame::Expand(GroupVisit {
                                path: parent.join(&child.id),
                                id: child.id,
                            }));
                        }
                    }
                    Frame::Visit(group) => yield group,
                }
            }
        }
    }

    /// Every replay under `root`: each group's direct replays, in the order of
    /// [`GroupTreeWalker::groups`]
    pub fn replays(&self, root: &str, deep: bool) -> impl Stream<Item = Result<Replay>> + 'a {
        let client = self.client;
        let groups = self.groups(root);

        try_stream! {
            pin_mut!(groups);
            while let Some(group) = groups.next().await {
                let group = group?;
                let replays = client.replays(&ReplayFilter::new().group(group.id), usize::MAX, deep);
                pin_mut!(replays);
                while let Some(replay) = replays.next().await {
                    yield replay?;
                }
            }
        }
    }

    /// Write every replay under `root` to disk, returning the number of files.
    ///
    /// Files land in `folder/<root>`. When `recursive`, each child group gets
    /// a nested directory named by its id and replays are written into the
    /// directory of the group listing them; otherwise all replays share the
    /// root directory.
    pub async fn download(&self, root: &str, folder: &Path, recursive: bool) -> Result<usize> {
        let root_dir = folder.join(root);
        tokio::fs::create_dir_all(&root_dir).await?;

        let groups = self.groups(root);
        pin_mut!(groups);

        let mut written = 0;
        while let Some(group) = groups.next().await {
            let group = group?;
            let dir = if recursive {
                folder.join(&group.path)
            } else {
                root_dir.clone()
            };
            tokio::fs::create_dir_all(&dir).await?;

            let replays = self
                .client
                .replays(&ReplayFilter::new().group(group.id.as_str()), usize::MAX, false);
            pin_mut!(replays);

            while let Some(replay) = replays.next().await {
                self.client.download_replay(&replay?.id, &dir).await?;
                written += 1;
            }
            info!(group = %group.id, dir = %dir.display(), "Downloaded group replays");
        }

        Ok(written)
    }
}

/// Every direct child of `parent`, in server order
async fn child_groups(client: &BallchasingClient, parent: &str) -> Result<Vec<Group>> {
    client
        .groups(&GroupFilter::children_of(parent), usize::MAX)
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use crate::config::ClientConfig;
    use crate::error::BallchasingError;
    use crate::BallchasingClient;
    use futures::{StreamExt, TryStreamExt};
    use mockito::{Matcher, Mock, ServerGuard};
    use std::path::PathBuf;
    use std::time::Duration;

    fn client(server: &ServerGuard) -> BallchasingClient {
        BallchasingClient::from_config(
            ClientConfig::new("test-key")
                .with_base_url(server.url())
                .with_sleep_on_rate_limit(Duration::ZERO),
        )
        .unwrap()
    }

    fn list_json(ids: &[&str]) -> String {
        let list: Vec<serde_json::Value> =
            ids.iter().map(|id| serde_json::json!({"id": id})).collect();
        serde_json::json!({"list": list, "next": null}).to_string()
    }

    async fn children(server: &mut ServerGuard, parent: &str, ids: &[&str]) -> Mock {
        server
            .mock("GET", "/groups/")
            .match_query(Matcher::UrlEncoded("group".into(), parent.into()))
            .with_status(200)
            .with_body(list_json(ids))
            .create_async()
            .await
    }

    async fn direct_replays(server: &mut ServerGuard, group: &str, ids: &[&str]) -> Mock {
        server
            .mock("GET", "/replays")
            .match_query(Matcher::UrlEncoded("group".into(), group.into()))
            .with_status(200)
            .with_body(list_json(ids))
            .create_async()
            .await
    }

    async fn walk_ids(client: &BallchasingClient, root: &str) -> Vec<String> {
        client
            .group_replays(root, false)
            .map_ok(|r| r.id)
            .try_collect()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_child_replays_found_through_empty_root() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = vec![
            children(&mut server, "root", &["child"]).await,
            children(&mut server, "child", &[]).await,
            direct_replays(&mut server, "child", &["r1", "r2"]).await,
            direct_replays(&mut server, "root", &[]).await,
        ];

        let client = client(&server);
        assert_eq!(walk_ids(&client, "root").await, vec!["r1", "r2"]);
    }

    #[tokio::test]
    async fn test_empty_group_yields_nothing() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = vec![
            children(&mut server, "lonely", &[]).await,
            direct_replays(&mut server, "lonely", &[]).await,
        ];

        let client = client(&server);
        assert!(walk_ids(&client, "lonely").await.is_empty());
    }

    #[tokio::test]
    async fn test_descendants_before_own_replays_in_server_order() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = vec![
            children(&mut server, "root", &["a", "b"]).await,
            children(&mut server, "a", &["a1"]).await,
            children(&mut server, "a1", &[]).await,
            children(&mut server, "b", &[]).await,
            direct_replays(&mut server, "a1", &["r1"]).await,
            direct_replays(&mut server, "a", &["r2"]).await,
            direct_replays(&mut server, "b", &["r3"]).await,
            direct_replays(&mut server, "root", &["r4"]).await,
        ];

        let client = client(&server);
        assert_eq!(walk_ids(&client, "root").await, vec!["r1", "r2", "r3", "r4"]);
    }

    #[tokio::test]
    async fn test_groups_visited_post_order_with_paths() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = vec![
            children(&mut server, "root", &["a", "b"]).await,
            children(&mut server, "a", &["a1"]).await,
            children(&mut server, "a1", &[]).await,
            children(&mut server, "b", &[]).await,
        ];

        let client = client(&server);
        let visits: Vec<(String, PathBuf)> = client
            .walker()
            .groups("root")
            .map_ok(|g| (g.id, g.path))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(
            visits,
            vec![
                ("a1".to_string(), PathBuf::from("root/a/a1")),
                ("a".to_string(), PathBuf::from("root/a")),
                ("b".to_string(), PathBuf::from("root/b")),
                ("root".to_string(), PathBuf::from("root")),
            ]
        );
    }

    #[tokio::test]
    async fn test_cycle_terminates() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = vec![
            children(&mut server, "root", &["a"]).await,
            children(&mut server, "a", &["root"]).await,
            direct_replays(&mut server, "a", &["r1"]).await,
            direct_replays(&mut server, "root", &["r2"]).await,
        ];

        let client = client(&server);
        assert_eq!(walk_ids(&client, "root").await, vec!["r1", "r2"]);
    }

    #[tokio::test]
    async fn test_subtree_failure_aborts_walk() {
        let mut server = mockito::Server::new_async().await;
        let _root = children(&mut server, "root", &["broken", "fine"]).await;
        let _broken = server
            .mock("GET", "/groups/")
            .match_query(Matcher::UrlEncoded("group".into(), "broken".into()))
            .with_status(500)
            .create_async()
            .await;
        let untouched = server
            .mock("GET", "/groups/")
            .match_query(Matcher::UrlEncoded("group".into(), "fine".into()))
            .expect(0)
            .create_async()
            .await;

        let client = client(&server);
        let walk = client.group_replays("root", false);
        futures::pin_mut!(walk);

        let first = walk.next().await.unwrap();
        assert!(matches!(first, Err(BallchasingError::Remote { .. })));
        assert!(walk.next().await.is_none());
        untouched.assert_async().await;
    }

    async fn replay_file(server: &mut ServerGuard, id: &str) -> Mock {
        server
            .mock("GET", format!("/replays/{}/file", id).as_str())
            .with_status(200)
            .with_body(format!("bytes-of-{}", id))
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_recursive_download_nests_directories() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = vec![
            children(&mut server, "root", &["child"]).await,
            children(&mut server, "child", &[]).await,
            direct_replays(&mut server, "child", &["r1"]).await,
            direct_replays(&mut server, "root", &["r2"]).await,
            replay_file(&mut server, "r1").await,
            replay_file(&mut server, "r2").await,
        ];

        let dir = tempfile::tempdir().unwrap();
        let client = client(&server);
        let written = client.download_group("root", dir.path(), true).await.unwrap();

        assert_eq!(written, 2);
        let nested = dir.path().join("root").join("child").join("r1.replay");
        assert_eq!(std::fs::read_to_string(nested).unwrap(), "bytes-of-r1");
        let top = dir.path().join("root").join("r2.replay");
        assert_eq!(std::fs::read_to_string(top).unwrap(), "bytes-of-r2");
    }

    #[tokio::test]
    async fn test_flat_download_shares_root_directory() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = vec![
            children(&mut server, "root", &["child"]).await,
            children(&mut server, "child", &[]).await,
            direct_replays(&mut server, "child", &["r1"]).await,
            direct_replays(&mut server, "root", &["r2"]).await,
            replay_file(&mut server, "r1").await,
            replay_file(&mut server, "r2").await,
        ];

        let dir = tempfile::tempdir().unwrap();
        let client = client(&server);
        let written = client.download_group("root", dir.path(), false).await.unwrap();

        assert_eq!(written, 2);
        assert!(dir.path().join("root").join("r1.replay").exists());
        assert!(dir.path().join("root").join("r2.replay").exists());
        assert!(!dir.path().join("root").join("child").exists());
    }
}
