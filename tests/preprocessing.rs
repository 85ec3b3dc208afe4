mod common;

use camino::Utf8PathBuf;
use common::{write_raw_file, write_walkers, TempRoot};
use pedtraj::{
    loader::layout::Split,
    records::{
        artifact::PreprocessedData,
        preprocess::{build_datasets, frame_preprocess, HoldOut},
        raw_record::ParseMode,
    },
    DataLayout, DataLoader, LoaderParams, PedTrajError, RunMode,
};
use rand::{rngs::StdRng, SeedableRng};

fn loader(root: &TempRoot, params: LoaderParams, mode: RunMode) -> Result<DataLoader, PedTrajError> {
    let layout = DataLayout::new(&root.path, &params.dataset_dirs);
    DataLoader::new(layout, params, mode, &mut StdRng::seed_from_u64(7))
}

#[test]
fn test_rerun_is_byte_identical() {
    let root = TempRoot::new();
    let sources: Vec<Utf8PathBuf> = vec![root.path.join("raw/a.txt"), root.path.join("raw/b.txt")];
    // frames deliberately out of numeric order
    write_raw_file(
        &sources[0],
        &[
            (30, 1, "0.5", "1.5"),
            (10, 2, "0.1", "0.2"),
            (30, 2, "0.3", "0.4"),
            (20, 1, "0.6", "1.6"),
        ],
    );
    write_walkers(&sources[1], 12, 0, 4);

    let first = root.path.join("out/first.bin");
    let second = root.path.join("out/second.bin");
    let data = frame_preprocess(&sources, &first, ParseMode::Labelled, HoldOut::Fraction(0.25))
        .unwrap();
    frame_preprocess(&sources, &second, ParseMode::Labelled, HoldOut::Fraction(0.25)).unwrap();

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
    assert_eq!(PreprocessedData::load(&first).unwrap(), data);

    let a = &data.datasets[0];
    assert_eq!(a.name, "a.txt");
    assert_eq!(a.valid_frame_numbers, vec![30]);
    assert_eq!(a.frame_numbers, vec![10, 20]);
    assert_eq!(a.valid_agent_lists, vec![vec![1, 2]]);
    assert_eq!(a.target_ids, vec![1, 2]);
    assert_eq!(a.raw_records.len(), 4);

    let b = &data.datasets[1];
    assert_eq!(b.valid_frames.len(), 3);
    assert_eq!(b.frames.len(), 9);
}

#[test]
fn test_missing_markers_in_test_files() {
    let root = TempRoot::new();
    let path = root.path.join("data/test/herms/t.txt");
    write_raw_file(
        &path,
        &[
            (1, 1, "0.0", "0.0"),
            (1, 2, "1.0", "1.0"),
            (2, 1, "0.1", "0.1"),
            (2, 2, "?", "?"),
            (3, 1, "0.2", "0.2"),
            (3, 2, "?", "?"),
        ],
    );

    let data = build_datasets(&[path.clone()], ParseMode::Test, HoldOut::Disabled).unwrap();
    assert_eq!(data.datasets[0].target_ids, vec![2]);
    assert!(data.datasets[0].frames[1].position_of(2).unwrap().is_missing());

    assert!(matches!(
        build_datasets(&[path], ParseMode::Labelled, HoldOut::Disabled),
        Err(PedTrajError::Parsing(_))
    ));
}

#[test]
fn test_infer_mode_uses_test_split() {
    let root = TempRoot::new();
    write_walkers(&root.path.join("data/train/herms/a.txt"), 30, 0, 1);
    write_raw_file(
        &root.path.join("data/test/herms/t.txt"),
        &[(1, 5, "0.0", "0.0"), (2, 5, "?", "?"), (3, 5, "?", "?")],
    );

    let params = LoaderParams::builder()
        .seq_length(2)
        .batch_size(1)
        .val_fraction(0.5)
        .build()
        .unwrap();
    let mut loader = loader(&root, params, RunMode::Infer).unwrap();
    assert!(root.path.join("data/test/trajectories_test.bin").is_file());
    assert!(!root.path.join("data/train/trajectories_train.bin").is_file());

    let dataset = loader.dataset(0).unwrap();
    assert_eq!(dataset.frames.len(), 3);
    assert!(dataset.valid_frames.is_empty());

    let mut batch = loader.next_batch().unwrap();
    let seq = &mut batch.sequences[0];
    assert_eq!(seq.target_id, Some(5));
    seq.clean_for_test(1, 1);
    assert_eq!(seq.agent_lists, vec![vec![5], vec![5]]);
}

#[test]
fn test_train_mode_holds_out_leading_frames() {
    let root = TempRoot::new();
    write_walkers(&root.path.join("data/train/herms/a.txt"), 25, 0, 1);

    let params = LoaderParams::builder()
        .seq_length(5)
        .batch_size(1)
        .val_fraction(0.2)
        .build()
        .unwrap();
    let mut loader = loader(&root, params, RunMode::Train).unwrap();
    assert_eq!(loader.num_batches(), 4);
    assert_eq!(loader.valid_num_batches(), 1);

    let valid = loader.next_valid_batch().unwrap();
    let train = loader.next_batch().unwrap();
    let dataset = loader.dataset(0).unwrap();
    assert_eq!(valid.sequences[0].source, dataset.valid_frames[..5].to_vec());
    assert_eq!(train.sequences[0].source, dataset.frames[..5].to_vec());
    assert_eq!(dataset.valid_frame_numbers, (0..5).collect::<Vec<_>>());
    assert_eq!(loader.valid_pointer().frame_index, 5);
    assert_eq!(loader.train_pointer().frame_index, 5);
}

#[test]
fn test_validation_pointer_rotates_on_its_own() {
    let root = TempRoot::new();
    let train = root.path.join("data/train/herms");
    write_walkers(&train.join("a.txt"), 25, 0, 1);
    write_walkers(&train.join("b.txt"), 25, 100, 11);

    let params = LoaderParams::builder()
        .seq_length(5)
        .batch_size(1)
        .val_fraction(0.2)
        .build()
        .unwrap();
    let mut loader = loader(&root, params, RunMode::Train).unwrap();
    assert_eq!(loader.valid_num_batches(), 2);

    let expected = [(0, Some(1)), (1, Some(11)), (0, Some(1))];
    for (dataset_index, target_id) in expected {
        let batch = loader.next_valid_batch().unwrap();
        assert_eq!(batch.dataset_indices(), vec![dataset_index]);
        assert_eq!(batch.target_ids(), vec![target_id]);
        assert_eq!(loader.valid_pointer().dataset_index, dataset_index);
        assert_eq!(loader.valid_pointer().frame_index, 5);

        let held_out = &loader.dataset(dataset_index).unwrap().valid_frames;
        assert_eq!(batch.sequences[0].source, held_out[..5].to_vec());
        assert_eq!(loader.train_pointer().dataset_index, 0);
        assert_eq!(loader.train_pointer().frame_index, 0);
    }
}

#[test]
fn test_generate_mode_keeps_every_frame() {
    let root = TempRoot::new();
    write_walkers(&root.path.join("data/train/herms/a.txt"), 25, 0, 1);

    let params = LoaderParams::builder().val_fraction(0.2).build().unwrap();
    let loader = loader(&root, params, RunMode::Generate).unwrap();
    assert_eq!(loader.dataset(0).unwrap().frames.len(), 25);
}

#[test]
fn test_existing_artifact_is_reused_unless_forced() {
    let root = TempRoot::new();
    let file = root.path.join("data/train/herms/a.txt");
    write_walkers(&file, 10, 0, 1);

    let params = LoaderParams::builder().seq_length(5).build().unwrap();
    loader(&root, params.clone(), RunMode::Train).unwrap();

    write_walkers(&file, 20, 0, 1);
    let stale = loader(&root, params.clone(), RunMode::Train).unwrap();
    assert_eq!(stale.dataset(0).unwrap().frames.len(), 10);

    let forced = LoaderParams {
        force_preprocess: true,
        ..params
    };
    let fresh = loader(&root, forced, RunMode::Train).unwrap();
    assert_eq!(fresh.dataset(0).unwrap().frames.len(), 20);
}

#[test]
fn test_missing_validation_files_degrade() {
    let root = TempRoot::new();
    write_walkers(&root.path.join("data/train/herms/a.txt"), 25, 0, 1);

    let params = LoaderParams::builder().num_validation(2).build().unwrap();
    let mut loader = loader(&root, params, RunMode::Train).unwrap();
    assert!(!loader.has_validation());
    assert!(loader.validation_files().is_empty());

    loader.switch_to_dataset_type(false, true).unwrap();
    assert_eq!(loader.seq_length(), 20);
    assert_eq!(loader.active_files(), loader.train_files());
}

#[test]
fn test_switch_between_train_and_validation() {
    let root = TempRoot::new();
    write_walkers(&root.path.join("data/train/herms/a.txt"), 40, 0, 1);
    write_walkers(&root.path.join("data/validation/herms/v1.txt"), 12, 0, 20);
    write_walkers(&root.path.join("data/validation/herms/v2.txt"), 12, 0, 30);

    let params = LoaderParams::builder()
        .seq_length(20)
        .alternate_seq_length(6)
        .batch_size(1)
        .num_validation(5)
        .build()
        .unwrap();
    let mut loader = loader(&root, params, RunMode::Train).unwrap();
    assert!(loader.has_validation());
    assert_eq!(loader.validation_files().len(), 2);
    assert!(root
        .path
        .join("data/validation/trajectories_val.bin")
        .is_file());

    loader.next_batch().unwrap();
    loader.switch_to_dataset_type(false, true).unwrap();
    assert_eq!(loader.seq_length(), 6);
    assert_eq!(loader.num_datasets(), 2);
    assert_eq!(loader.num_batches(), 4);
    assert_eq!(loader.train_pointer().frame_index, 0);
    let batch = loader.next_batch().unwrap();
    assert_eq!(batch.sequences[0].source.len(), 6);
    assert_eq!(batch.sequences[0].target_id, Some(20));

    loader.switch_to_dataset_type(true, true).unwrap();
    assert_eq!(loader.seq_length(), 20);
    assert_eq!(loader.num_datasets(), 1);
    assert_eq!(loader.num_batches(), 2);
}

#[test]
fn test_no_active_files() {
    let root = TempRoot::new();
    let params = LoaderParams::default();
    assert_eq!(
        loader(&root, params, RunMode::Train).err(),
        Some(PedTrajError::EmptyDatasetList)
    );
}

#[test]
fn test_params_from_json() {
    let root = TempRoot::new();
    let path = root.path.join("loader.json");
    std::fs::write(
        &path,
        r#"{ "batch_size": 3, "seq_length": 8, "val_fraction": 0.1 }"#,
    )
    .unwrap();
    let params = LoaderParams::from_json_file(&path).unwrap();
    assert_eq!(params.batch_size, 3);
    assert_eq!(params.seq_length, 8);

    std::fs::write(&path, r#"{ "seq_length": 0 }"#).unwrap();
    assert!(matches!(
        LoaderParams::from_json_file(&path),
        Err(PedTrajError::InvalidLoaderParameter(_))
    ));

    let layout = DataLayout::new(&root.path, &params.dataset_dirs);
    assert_eq!(layout.dataset_paths(Split::Train), Ok(vec![]));
}
