use crate::*;
use std::time::Duration;

// ══════════════════════════════════════════════════════════════════════════════
//  Worker isolation
// ══════════════════════════════════════════════════════════════════════════════

/// Many clients at once, each with its own key, each gets its own answer.
#[tokio::test]
async fn test_parallel_clients_get_their_own_replies() {
    let server = Arc::new(TestServer::start().await.unwrap());

    let mut handles = Vec::new();
    for i in 0..50u8 {
        let server = server.clone();
        handles.push(tokio::spawn(async move {
            let key = i % 25 + 1;
            let (animal, sound) = [("Dog", "Woof"), ("Cat", "Meow"), ("Duck", "Quack")]
                [usize::from(i) % 3];
            let text = server.request(3, key, Method::Atos, animal).await.unwrap();
            assert_eq!(text, format!("'{animal}' sound is {sound}"));
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let server = Arc::try_unwrap(server).ok().expect("all clients finished");
    server.stop().await.unwrap();
}

/// A client that connects and never sends must not block anyone else.
#[tokio::test]
async fn test_silent_client_does_not_stall_others() {
    let server = TestServer::start().await.unwrap();

    let _silent = TcpStream::connect(server.addr).await.unwrap();

    let text = tokio::time::timeout(
        Duration::from_secs(5),
        server.request(2, 3, Method::Vers, ""),
    )
    .await
    .expect("request should not be blocked by the silent client")
    .unwrap();
    assert_eq!(text, "Server supports ASP versions 2, 3.");

    server.stop().await.unwrap();
}
