//! Collecting operators: accumulate the whole source into a collection and
//! emit it once the source completes.

use std::{
  collections::{HashMap, HashSet},
  hash::Hash,
  sync::{Arc, Mutex},
};

use crate::{
  error::{Result, RxError},
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
};

type Insert<T, C> = Arc<dyn Fn(&mut C, T) -> Result<()> + Send + Sync>;

pub struct CollectObserver<T, C> {
  observer: BoxedObserver<C>,
  collection: Mutex<Option<C>>,
  insert: Insert<T, C>,
}

impl<T, C: Value> Observer<T> for CollectObserver<T, C> {
  fn on_next(&self, value: T) {
    let failed = {
      let mut collection = lock(&self.collection);
      match collection.as_mut() {
        Some(c) => (self.insert)(c, value).err(),
        None => return,
      }
    };
    if let Some(err) = failed {
      lock(&self.collection).take();
      self.observer.on_error(err);
    }
  }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) {
    if let Some(c) = lock(&self.collection).take() {
      self.observer.on_next(c);
      self.observer.on_completed();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

fn collect_into<T: Value, C: Value + Default>(
  source: Observable<T>,
  insert: Insert<T, C>,
) -> Observable<C> {
  Observable::new(move |observer, scheduler| {
    source.subscribe_with(
      CollectObserver {
        observer,
        collection: Mutex::new(Some(C::default())),
        insert: insert.clone(),
      },
      scheduler,
    )
  })
}

impl<T: Value> Observable<T> {
  /// Emits every value as one `Vec` when the source completes.
  pub fn to_vec(self) -> Observable<Vec<T>> {
    collect_into(
      self,
      Arc::new(|c: &mut Vec<T>, v| {
        c.push(v);
        Ok(())
      }),
    )
  }

  /// Emits the distinct values as one set when the source completes.
  pub fn to_set(self) -> Observable<HashSet<T>>
  where
    T: Eq + Hash,
  {
    collect_into(
      self,
      Arc::new(|c: &mut HashSet<T>, v| {
        c.insert(v);
        Ok(())
      }),
    )
  }

  /// Emits a map keyed by `key` when the source completes. Later values
  /// overwrite earlier ones with the same key.
  pub fn to_dict<K>(self, key: impl Fn(&T) -> K + Send + Sync + 'static) -> Observable<HashMap<K, T>>
  where
    K: Value + Eq + Hash,
  {
    collect_into(
      self,
      Arc::new(move |c: &mut HashMap<K, T>, v| {
        c.insert(key(&v), v);
        Ok(())
      }),
    )
  }

  /// Like [`to_dict`](Observable::to_dict) with fallible key and value
  /// mappers. A mapper error terminates the stream with that error.
  pub fn to_dict_with<K, V>(
    self,
    key: impl Fn(&T) -> Result<K> + Send + Sync + 'static,
    value: impl Fn(&T) -> Result<V> + Send + Sync + 'static,
  ) -> Observable<HashMap<K, V>>
  where
    K: Value + Eq + Hash,
    V: Value,
  {
    collect_into(
      self,
      Arc::new(move |c: &mut HashMap<K, V>, v| {
        c.insert(key(&v)?, value(&v)?);
        Ok(())
      }),
    )
  }
}

#[cfg(test)]
mod test {
  use std::collections::{HashMap, HashSet};

  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn to_vec_on_completion() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(vec![
      RT::on_next(210., 1),
      RT::on_next(220., 2),
      RT::on_completed(230.),
    ]);
    let observer = scheduler.start(move || xs.observable().to_vec());
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(230., vec![1, 2]), RT::on_completed(230.)]
    );
  }

  #[test]
  fn to_set_dedups() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| of(vec![1, 2, 1, 3, 2]).to_set());
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(200., HashSet::from([1, 2, 3])),
        RT::on_completed(200.)
      ]
    );
  }

  #[test]
  fn to_dict_later_keys_win() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| of(vec!["apple", "avocado", "banana"]).to_dict(|s| s.chars().next()));
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(
          200.,
          HashMap::from([(Some('a'), "avocado"), (Some('b'), "banana")])
        ),
        RT::on_completed(200.)
      ]
    );
  }

  #[test]
  fn to_dict_mapper_error() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| {
      from_iter(1..=3).to_dict_with(
        |v| if *v == 2 { Err(RxError::user("bad key")) } else { Ok(*v) },
        |v| Ok(v * 10),
      )
    });
    assert_eq!(observer.messages(), vec![RT::on_error(200., RxError::user("bad key"))]);
  }

  #[test]
  fn error_forwarded_without_collection() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| throw::<i32>(RxError::user("e")).to_vec());
    assert_eq!(observer.messages(), vec![RT::on_error(200., RxError::user("e"))]);
  }
}
